//! Builds parameterized SELECT, COUNT, INSERT, UPDATE and DELETE statements.
//! Identifiers come from code constants only; every value is a bind parameter.

use super::params::SqlParam;

/// Quote identifier for PostgreSQL.
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

/// Column reference, optionally prefixed by a table alias.
pub fn column(alias: Option<&str>, name: &str) -> String {
    match alias {
        Some(a) => format!("{}.{}", a, quoted(name)),
        None => quoted(name),
    }
}

/// Comma-separated column list.
pub fn column_list(alias: Option<&str>, names: &[&str]) -> String {
    names
        .iter()
        .map(|n| column(alias, n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE patterns.
pub fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: SqlParam) -> usize {
        self.params.push(v);
        self.params.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cmp {
    Eq,
    Gte,
    Lte,
}

impl Cmp {
    fn op(self) -> &'static str {
        match self {
            Cmp::Eq => "=",
            Cmp::Gte => ">=",
            Cmp::Lte => "<=",
        }
    }
}

/// AND-joined predicates with their parameters, numbered from `$1`.
#[derive(Clone, Debug, Default)]
pub struct Conditions {
    alias: Option<&'static str>,
    parts: Vec<String>,
    params: Vec<SqlParam>,
}

impl Conditions {
    pub fn new() -> Self {
        Conditions::default()
    }

    /// Predicates reference columns through `alias` (e.g. `r."airline_id"`).
    pub fn with_alias(alias: &'static str) -> Self {
        Conditions {
            alias: Some(alias),
            ..Conditions::default()
        }
    }

    fn bind(&mut self, v: SqlParam) -> String {
        self.params.push(v);
        format!("${}", self.params.len())
    }

    fn col(&self, name: &str) -> String {
        column(self.alias, name)
    }

    pub fn is_true(&mut self, name: &str) -> &mut Self {
        let c = self.col(name);
        self.parts.push(format!("{} IS TRUE", c));
        self
    }

    pub fn compare(&mut self, name: &str, cmp: Cmp, v: impl Into<SqlParam>) -> &mut Self {
        let c = self.col(name);
        let ph = self.bind(v.into());
        self.parts.push(format!("{} {} {}", c, cmp.op(), ph));
        self
    }

    pub fn eq(&mut self, name: &str, v: impl Into<SqlParam>) -> &mut Self {
        self.compare(name, Cmp::Eq, v)
    }

    /// Equality on a column of another joined table.
    pub fn eq_in(&mut self, alias: &str, name: &str, v: impl Into<SqlParam>) -> &mut Self {
        let c = column(Some(alias), name);
        let ph = self.bind(v.into());
        self.parts.push(format!("{} = {}", c, ph));
        self
    }

    /// Case-insensitive substring match against any of `names` (one OR group).
    pub fn icontains_any(&mut self, names: &[&str], needle: &str) -> &mut Self {
        if names.is_empty() {
            return self;
        }
        let ph = self.bind(SqlParam::from(format!("%{}%", escape_like(needle))));
        let group = names
            .iter()
            .map(|n| format!("{} ILIKE {}", self.col(n), ph))
            .collect::<Vec<_>>()
            .join(" OR ");
        self.parts.push(format!("({})", group));
        self
    }

    pub fn params(&self) -> &[SqlParam] {
        &self.params
    }

    /// ` WHERE ...` or empty.
    pub fn where_clause(&self) -> String {
        if self.parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.parts.join(" AND "))
        }
    }
}

/// SELECT `columns` FROM `from` + conditions + ORDER BY + optional LIMIT/OFFSET (bound as parameters).
pub fn select(
    columns: &str,
    from: &str,
    conditions: &Conditions,
    order_by: &str,
    limit: Option<i64>,
    offset: Option<i64>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.params.extend(conditions.params.iter().cloned());
    let order_clause = if order_by.is_empty() {
        String::new()
    } else {
        format!(" ORDER BY {}", order_by)
    };
    let limit_clause = limit
        .map(|n| format!(" LIMIT ${}", q.push_param(SqlParam::from(n))))
        .unwrap_or_default();
    let offset_clause = offset
        .map(|n| format!(" OFFSET ${}", q.push_param(SqlParam::from(n))))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}{}",
        columns,
        from,
        conditions.where_clause(),
        order_clause,
        limit_clause,
        offset_clause
    );
    q
}

/// SELECT COUNT(*) over the same conditions.
pub fn count(from: &str, conditions: &Conditions) -> QueryBuf {
    QueryBuf {
        sql: format!("SELECT COUNT(*) FROM {}{}", from, conditions.where_clause()),
        params: conditions.params.to_vec(),
    }
}

/// INSERT the given column values; omitted columns take their DB defaults.
pub fn insert(table: &str, values: &[(&str, SqlParam)], returning: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    if values.is_empty() {
        q.sql = format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning);
        return q;
    }
    let mut cols = Vec::with_capacity(values.len());
    let mut placeholders = Vec::with_capacity(values.len());
    for (name, v) in values {
        let n = q.push_param(v.clone());
        cols.push(quoted(name));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table,
        cols.join(", "),
        placeholders.join(", "),
        returning
    );
    q
}

/// UPDATE by id: SET only the given columns, plus `updated_at = NOW()` when `touch_updated_at`.
/// `extra` predicates are AND-ed after the id match. With nothing to set this degrades to a SELECT.
pub fn update(
    table: &str,
    id: i64,
    values: &[(&str, SqlParam)],
    touch_updated_at: bool,
    extra: &[&str],
    returning: &str,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(values.len() + 1);
    for (name, v) in values {
        let n = q.push_param(v.clone());
        sets.push(format!("{} = ${}", quoted(name), n));
    }
    if touch_updated_at {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    let id_param = q.push_param(SqlParam::from(id));
    let mut predicate = format!("{} = ${}", quoted("id"), id_param);
    for e in extra {
        predicate.push_str(" AND ");
        predicate.push_str(e);
    }
    if sets.is_empty() {
        q.sql = format!("SELECT {} FROM {} WHERE {}", returning, table, predicate);
        return q;
    }
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} RETURNING {}",
        table,
        sets.join(", "),
        predicate,
        returning
    );
    q
}

/// DELETE by id.
pub fn delete(table: &str, id: i64) -> QueryBuf {
    QueryBuf {
        sql: format!("DELETE FROM {} WHERE {} = $1", table, quoted("id")),
        params: vec![SqlParam::from(id)],
    }
}
