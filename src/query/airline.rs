use super::{bool_param, decimal_param, first_i32, order_clause, text_param, Params};
use crate::error::{AppError, FieldErrors};
use crate::sql::{Cmp, Conditions};
use rust_decimal::Decimal;

pub const ALIAS: &str = "a";
pub const SEARCH_FIELDS: &[&str] = &["name", "iata_code", "icao_code", "country", "headquarters"];
pub const ORDERING_FIELDS: &[&str] = &["name", "founded_year", "fleet_size", "destinations"];

/// Filters accepted by every airline collection endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AirlineQuery {
    pub search_terms: Vec<String>,
    pub country: Option<String>,
    pub is_hiring: Option<bool>,
    pub fleet_size_gte: Option<i32>,
    pub fleet_size_lte: Option<i32>,
    pub destinations_gte: Option<i32>,
    pub destinations_lte: Option<i32>,
    pub founded_year_gte: Option<i32>,
    pub founded_year_lte: Option<i32>,
    pub min_pilot_salary: Option<Decimal>,
    pub max_pilot_salary: Option<Decimal>,
    pub region: Option<String>,
    pub ordering: Option<String>,
}

impl AirlineQuery {
    pub fn from_params(params: &Params) -> Result<Self, AppError> {
        let mut errors = FieldErrors::new();
        let mut q = AirlineQuery {
            search_terms: text_param(params, "search")
                .map(|s| {
                    s.split(|c: char| c.is_whitespace() || c == ',')
                        .filter(|t| !t.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            country: text_param(params, "country").map(str::to_ascii_uppercase),
            is_hiring: bool_param(params, "is_hiring", &mut errors),
            fleet_size_gte: first_i32(params, &["fleet_size__gte", "min_fleet_size"], &mut errors),
            fleet_size_lte: first_i32(params, &["fleet_size__lte", "max_fleet_size"], &mut errors),
            destinations_gte: first_i32(params, &["destinations__gte", "min_destinations"], &mut errors),
            destinations_lte: first_i32(params, &["destinations__lte", "max_destinations"], &mut errors),
            founded_year_gte: first_i32(params, &["founded_year__gte"], &mut errors),
            founded_year_lte: first_i32(params, &["founded_year__lte"], &mut errors),
            min_pilot_salary: decimal_param(params, "min_pilot_salary", &mut errors),
            max_pilot_salary: decimal_param(params, "max_pilot_salary", &mut errors),
            region: text_param(params, "region").map(str::to_string),
            ordering: text_param(params, "ordering").map(str::to_string),
        };
        // the web client's shortcut; anything but a true value is ignored
        if text_param(params, "hiring").and_then(crate::service::validation::parse_bool) == Some(true) {
            q.is_hiring = Some(true);
        }
        errors.into_result()?;
        Ok(q)
    }

    pub fn hiring_only(mut self) -> Self {
        self.is_hiring = Some(true);
        self
    }

    pub fn in_country(mut self, code: &str) -> Self {
        self.country = Some(code.trim().to_ascii_uppercase());
        self
    }

    /// Active rows matching every filter, columns qualified with [`ALIAS`].
    pub fn conditions(&self) -> Conditions {
        let mut c = Conditions::with_alias(ALIAS);
        c.is_true("is_active");
        for term in &self.search_terms {
            c.icontains_any(SEARCH_FIELDS, term);
        }
        if let Some(country) = &self.country {
            c.eq("country", country.as_str());
        }
        if let Some(hiring) = self.is_hiring {
            c.eq("is_hiring", hiring);
        }
        let ranges = [
            ("fleet_size", Cmp::Gte, self.fleet_size_gte),
            ("fleet_size", Cmp::Lte, self.fleet_size_lte),
            ("destinations", Cmp::Gte, self.destinations_gte),
            ("destinations", Cmp::Lte, self.destinations_lte),
            ("founded_year", Cmp::Gte, self.founded_year_gte),
            ("founded_year", Cmp::Lte, self.founded_year_lte),
        ];
        for (name, cmp, bound) in ranges {
            if let Some(v) = bound {
                c.compare(name, cmp, v);
            }
        }
        if let Some(v) = self.min_pilot_salary {
            c.compare("pilot_salary_min", Cmp::Gte, v);
        }
        if let Some(v) = self.max_pilot_salary {
            c.compare("pilot_salary_max", Cmp::Lte, v);
        }
        if let Some(region) = &self.region {
            c.icontains_any(&["country", "hiring_regions"], region);
        }
        c
    }

    pub fn order_by(&self) -> String {
        order_clause(ALIAS, self.ordering.as_deref(), ORDERING_FIELDS, &[("name", false)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params;
    use crate::sql::SqlParam;

    #[test]
    fn no_params_means_active_rows_by_name() {
        let q = AirlineQuery::from_params(&params(&[])).unwrap();
        let c = q.conditions();
        assert_eq!(c.where_clause(), " WHERE a.\"is_active\" IS TRUE");
        assert_eq!(q.order_by(), "a.\"name\" ASC, a.\"id\" ASC");
    }

    #[test]
    fn search_terms_and_across_fields_or() {
        let q = AirlineQuery::from_params(&params(&[("search", "british, london")])).unwrap();
        assert_eq!(q.search_terms, vec!["british", "london"]);
        let c = q.conditions();
        let sql = c.where_clause();
        assert!(sql.contains("(a.\"name\" ILIKE $1 OR a.\"iata_code\" ILIKE $1"));
        assert!(sql.contains(") AND (a.\"name\" ILIKE $2"));
        assert_eq!(c.params()[0], SqlParam::from("%british%"));
    }

    #[test]
    fn ranges_aliases_and_salary() {
        let q = AirlineQuery::from_params(&params(&[
            ("min_fleet_size", "100"),
            ("destinations__lte", "50"),
            ("min_pilot_salary", "90000"),
            ("founded_year__gte", "1950"),
        ]))
        .unwrap();
        assert_eq!(q.fleet_size_gte, Some(100));
        let c = q.conditions();
        let sql = c.where_clause();
        assert!(sql.contains("a.\"fleet_size\" >= $1"));
        assert!(sql.contains("a.\"destinations\" <= $2"));
        assert!(sql.contains("a.\"founded_year\" >= $3"));
        assert!(sql.contains("a.\"pilot_salary_min\" >= $4"));
        assert_eq!(c.params()[3], SqlParam::from(Decimal::from(90000)));
    }

    #[test]
    fn region_matches_country_or_hiring_regions() {
        let q = AirlineQuery::from_params(&params(&[("region", "AE")])).unwrap();
        assert!(q
            .conditions()
            .where_clause()
            .ends_with("(a.\"country\" ILIKE $1 OR a.\"hiring_regions\" ILIKE $1)"));
    }

    #[test]
    fn hiring_shortcut_and_derived_filters() {
        let q = AirlineQuery::from_params(&params(&[("hiring", "true")])).unwrap();
        assert_eq!(q.is_hiring, Some(true));
        let q = AirlineQuery::from_params(&params(&[("hiring", "nope")])).unwrap();
        assert_eq!(q.is_hiring, None);
        let q = AirlineQuery::default().hiring_only().in_country(" gb");
        assert_eq!(q.country.as_deref(), Some("GB"));
        assert_eq!(q.is_hiring, Some(true));
    }

    #[test]
    fn malformed_values_are_reported_per_field() {
        let err = AirlineQuery::from_params(&params(&[
            ("fleet_size__gte", "many"),
            ("is_hiring", "perhaps"),
            ("max_pilot_salary", "lots"),
        ]))
        .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert!(fields.contains("fleet_size__gte"));
                assert!(fields.contains("is_hiring"));
                assert!(fields.contains("max_pilot_salary"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn ordering_descending() {
        let q = AirlineQuery::from_params(&params(&[("ordering", "-founded_year")])).unwrap();
        assert_eq!(q.order_by(), "a.\"founded_year\" DESC, a.\"id\" DESC");
    }
}
