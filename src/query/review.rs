use super::{i32_param, int_param, order_clause, text_param, Params};
use crate::error::{AppError, FieldErrors};
use crate::model::{EmploymentStatus, Position};
use crate::sql::{Cmp, Conditions};
use std::str::FromStr;

pub const ALIAS: &str = "r";
pub const ORDERING_FIELDS: &[&str] = &["created_at", "overall_rating"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReviewQuery {
    pub airline: Option<i64>,
    pub position: Option<Position>,
    pub employment_status: Option<EmploymentStatus>,
    pub rating_gte: Option<i32>,
    pub rating_lte: Option<i32>,
    pub ordering: Option<String>,
}

fn choice_param<T: FromStr>(params: &Params, name: &str, errors: &mut FieldErrors) -> Option<T> {
    let raw = text_param(params, name)?;
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(
                name,
                format!("Select a valid choice. {} is not one of the available choices.", raw),
            );
            None
        }
    }
}

impl ReviewQuery {
    pub fn from_params(params: &Params) -> Result<Self, AppError> {
        let mut errors = FieldErrors::new();
        let airline = int_param(params, "airline", &mut errors).or(int_param(params, "airline_id", &mut errors));
        let rating_gte = i32_param(params, "overall_rating__gte", &mut errors)
            .or(i32_param(params, "min_rating", &mut errors));
        let q = ReviewQuery {
            airline,
            position: choice_param(params, "position", &mut errors),
            employment_status: choice_param(params, "employment_status", &mut errors),
            rating_gte,
            rating_lte: i32_param(params, "overall_rating__lte", &mut errors),
            ordering: text_param(params, "ordering").map(str::to_string),
        };
        errors.into_result()?;
        Ok(q)
    }

    /// Active reviews of one airline, newest first.
    pub fn for_airline(airline_id: i64) -> Self {
        ReviewQuery {
            airline: Some(airline_id),
            ..ReviewQuery::default()
        }
    }

    pub fn conditions(&self) -> Conditions {
        let mut c = Conditions::with_alias(ALIAS);
        c.is_true("is_active");
        if let Some(id) = self.airline {
            c.eq("airline_id", id);
        }
        if let Some(p) = self.position {
            c.eq("position", p.as_str());
        }
        if let Some(s) = self.employment_status {
            c.eq("employment_status", s.as_str());
        }
        if let Some(v) = self.rating_gte {
            c.compare("overall_rating", Cmp::Gte, v);
        }
        if let Some(v) = self.rating_lte {
            c.compare("overall_rating", Cmp::Lte, v);
        }
        c
    }

    pub fn order_by(&self) -> String {
        order_clause(ALIAS, self.ordering.as_deref(), ORDERING_FIELDS, &[("created_at", true)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::params;

    #[test]
    fn newest_first_by_default() {
        let q = ReviewQuery::from_params(&params(&[])).unwrap();
        assert_eq!(q.order_by(), "r.\"created_at\" DESC, r.\"id\" DESC");
        assert_eq!(q.conditions().where_clause(), " WHERE r.\"is_active\" IS TRUE");
    }

    #[test]
    fn exact_and_rating_filters() {
        let q = ReviewQuery::from_params(&params(&[
            ("airline_id", "7"),
            ("position", "PILOT"),
            ("employment_status", "FORMER"),
            ("min_rating", "4"),
        ]))
        .unwrap();
        assert_eq!(q.airline, Some(7));
        assert_eq!(q.position, Some(Position::Pilot));
        assert_eq!(q.rating_gte, Some(4));
        assert_eq!(
            q.conditions().where_clause(),
            " WHERE r.\"is_active\" IS TRUE AND r.\"airline_id\" = $1 AND r.\"position\" = $2 \
             AND r.\"employment_status\" = $3 AND r.\"overall_rating\" >= $4"
        );
    }

    #[test]
    fn unknown_choice_is_a_field_error() {
        match ReviewQuery::from_params(&params(&[("position", "CAPTAIN")])) {
            Err(AppError::Validation(fields)) => assert!(fields.contains("position")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn ordering_by_rating() {
        let q = ReviewQuery::from_params(&params(&[("ordering", "-overall_rating")])).unwrap();
        assert_eq!(q.order_by(), "r.\"overall_rating\" DESC, r.\"id\" DESC");
    }
}
