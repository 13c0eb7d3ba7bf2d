//! Query-string parsing into filters, orderings and page windows.

mod airline;
mod page;
mod review;

pub use airline::AirlineQuery;
pub use page::{Page, PageRequest};
pub use review::ReviewQuery;

use crate::error::FieldErrors;
use crate::service::validation::{parse_bool, parse_decimal};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Raw query-string pairs as axum hands them over.
pub type Params = HashMap<String, String>;

/// Trimmed value, `None` when absent or blank.
pub fn text_param<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
}

pub(crate) fn int_param(params: &Params, name: &str, errors: &mut FieldErrors) -> Option<i64> {
    let raw = text_param(params, name)?;
    match raw.parse::<i64>() {
        Ok(n) => Some(n),
        Err(_) => {
            errors.add(name, "Enter a whole number.");
            None
        }
    }
}

/// Integer parameter that must fit an INTEGER column.
pub(crate) fn i32_param(params: &Params, name: &str, errors: &mut FieldErrors) -> Option<i32> {
    let n = int_param(params, name, errors)?;
    match i32::try_from(n) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(name, "Enter a whole number.");
            None
        }
    }
}

pub(crate) fn bool_param(params: &Params, name: &str, errors: &mut FieldErrors) -> Option<bool> {
    let raw = text_param(params, name)?;
    let parsed = parse_bool(raw);
    if parsed.is_none() {
        errors.add(name, "Select a valid choice. That choice is not one of the available choices.");
    }
    parsed
}

pub(crate) fn decimal_param(params: &Params, name: &str, errors: &mut FieldErrors) -> Option<Decimal> {
    let raw = text_param(params, name)?;
    let parsed = parse_decimal(raw);
    if parsed.is_none() {
        errors.add(name, "Enter a number.");
    }
    parsed
}

/// First present name wins; used where the web client sends an alias.
pub(crate) fn first_i32(params: &Params, names: &[&str], errors: &mut FieldErrors) -> Option<i32> {
    names.iter().find_map(|n| i32_param(params, n, errors))
}

/// `ordering=-fleet_size,name` against an allow-list of column names.
/// Unknown terms are dropped; `fallback` applies when nothing usable remains. `id` breaks ties.
pub(crate) fn order_clause(
    alias: &str,
    raw: Option<&str>,
    allowed: &[&str],
    fallback: &[(&str, bool)],
) -> String {
    let mut terms: Vec<(String, bool)> = Vec::new();
    for term in raw.unwrap_or("").split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let (name, desc) = match term.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (term, false),
        };
        if allowed.contains(&name) && !terms.iter().any(|(n, _)| n == name) {
            terms.push((name.to_string(), desc));
        }
    }
    if terms.is_empty() {
        terms = fallback.iter().map(|(n, d)| (n.to_string(), *d)).collect();
    }
    if !terms.iter().any(|(n, _)| n == "id") {
        // ties break on id in the direction of the leading term
        let desc = terms.first().is_some_and(|(_, d)| *d);
        terms.push(("id".to_string(), desc));
    }
    terms
        .iter()
        .map(|(name, desc)| {
            format!(
                "{} {}",
                crate::sql::column(Some(alias), name),
                if *desc { "DESC" } else { "ASC" }
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
pub(crate) fn params(pairs: &[(&str, &str)]) -> Params {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_filters_unknown_terms_and_appends_id() {
        let allowed = &["name", "fleet_size"];
        assert_eq!(
            order_clause("a", Some("-fleet_size, bogus ,name"), allowed, &[("name", false)]),
            "a.\"fleet_size\" DESC, a.\"name\" ASC, a.\"id\" DESC"
        );
        assert_eq!(
            order_clause("a", Some("bogus"), allowed, &[("name", false)]),
            "a.\"name\" ASC, a.\"id\" ASC"
        );
        assert_eq!(order_clause("a", None, allowed, &[("name", false)]), "a.\"name\" ASC, a.\"id\" ASC");
    }

    #[test]
    fn malformed_numbers_become_field_errors() {
        let p = params(&[("fleet_size__gte", "lots"), ("page", " 2 ")]);
        let mut errors = FieldErrors::new();
        assert_eq!(int_param(&p, "fleet_size__gte", &mut errors), None);
        assert_eq!(int_param(&p, "page", &mut errors), Some(2));
        assert!(errors.contains("fleet_size__gte"));
        assert!(!errors.contains("page"));
    }

    #[test]
    fn blank_params_are_absent() {
        let p = params(&[("country", "  ")]);
        assert_eq!(text_param(&p, "country"), None);
    }
}
