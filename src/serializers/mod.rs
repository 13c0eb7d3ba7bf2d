//! JSON in both directions: rule-checked input turned into column assignments, and response projections.

pub mod airline;
pub mod blog;
pub mod review;
pub mod user;

use crate::error::AppError;
use crate::service::validation::{parse_decimal, FieldKind, Mode, RequestValidator, Rules};
use crate::service::Assignments;
use crate::sql::SqlParam;
use serde_json::{Map, Value};

/// Request bodies must be JSON objects.
pub fn into_object(body: Value) -> Result<Map<String, Value>, AppError> {
    match body {
        Value::Object(m) => Ok(m),
        _ => Err(AppError::BadRequest("body must be a JSON object".into())),
    }
}

/// Checks read-only fields and field rules together so every problem is reported at once.
pub fn parse_input(body: Value, rules: Rules, mode: Mode, read_only: &[&str]) -> Result<Map<String, Value>, AppError> {
    let mut map = into_object(body)?;
    let mut errors = RequestValidator::reject_read_only(&map, read_only);
    errors.merge(RequestValidator::check(&mut map, rules, mode));
    errors.into_result()?;
    Ok(map)
}

/// Column assignments for every ruled field present in an already validated body.
/// `renames` maps input names to column names where they differ.
pub fn assignments(
    body: &Map<String, Value>,
    rules: Rules,
    renames: &[(&str, &'static str)],
) -> Result<Assignments, AppError> {
    let mut out = Assignments::with_capacity(body.len());
    for (name, rule) in rules {
        let Some(v) = body.get(*name) else { continue };
        let column = renames
            .iter()
            .find(|(from, _)| from == name)
            .map(|(_, to)| *to)
            .unwrap_or(*name);
        out.push((column, to_param(name, rule.kind, v)?));
    }
    Ok(out)
}

fn to_param(name: &str, kind: FieldKind, v: &Value) -> Result<SqlParam, AppError> {
    let unexpected = || AppError::Internal(format!("unvalidated value for {}", name));
    Ok(match kind {
        FieldKind::Integer => match v {
            Value::Null => SqlParam::Int(None),
            _ => SqlParam::from(v.as_i64().and_then(|n| i32::try_from(n).ok()).ok_or_else(unexpected)?),
        },
        FieldKind::Boolean => SqlParam::from(v.as_bool().ok_or_else(unexpected)?),
        FieldKind::Decimal { .. } => match v {
            Value::Null => SqlParam::Decimal(None),
            _ => SqlParam::from(v.as_str().and_then(parse_decimal).ok_or_else(unexpected)?),
        },
        FieldKind::Text | FieldKind::Email | FieldKind::Url | FieldKind::Country => match v {
            Value::Null => SqlParam::Text(None),
            _ => SqlParam::from(v.as_str().ok_or_else(unexpected)?),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::FieldRule;
    use rust_decimal::Decimal;
    use serde_json::json;

    const RULES: Rules = &[
        ("airline", FieldRule::integer().required()),
        ("title", FieldRule::text()),
        ("salary", FieldRule::decimal(10, 2).nullable()),
        ("flag", FieldRule::boolean()),
    ];

    #[test]
    fn only_ruled_fields_become_assignments() {
        let map = parse_input(
            json!({ "airline": "3", "salary": "1200.5", "flag": "1", "ignored": 1 }),
            RULES,
            Mode::Full,
            &[],
        )
        .unwrap();
        let values = assignments(&map, RULES, &[("airline", "airline_id")]).unwrap();
        assert_eq!(
            values,
            vec![
                ("airline_id", SqlParam::from(3i32)),
                ("salary", SqlParam::from(Decimal::new(12005, 1))),
                ("flag", SqlParam::from(true)),
            ]
        );
    }

    #[test]
    fn nulls_bind_as_typed_nulls() {
        let map = parse_input(json!({ "salary": null }), RULES, Mode::Partial, &[]).unwrap();
        let values = assignments(&map, RULES, &[]).unwrap();
        assert_eq!(values, vec![("salary", SqlParam::Decimal(None))]);
    }

    #[test]
    fn read_only_and_rule_errors_are_combined() {
        let err = parse_input(json!({ "created_at": "now" }), RULES, Mode::Full, &["created_at"]).unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert!(fields.contains("created_at"));
                assert!(fields.contains("airline"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn non_object_bodies_are_bad_requests() {
        assert!(matches!(into_object(json!([1, 2])), Err(AppError::BadRequest(_))));
    }
}
