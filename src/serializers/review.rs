use crate::model::review::{RATING_MAX, RATING_MIN};
use crate::model::{AirlineReview, EmploymentStatus, Position};
use crate::service::validation::{FieldRule, Rules};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

const SUB_RATING: FieldRule = FieldRule::integer().nullable().range(RATING_MIN, RATING_MAX);

pub const REVIEW_RULES: Rules = &[
    ("airline", FieldRule::integer().required().min(1)),
    ("position", FieldRule::text().required().choices(Position::CHOICES)),
    ("title", FieldRule::text().required().max_length(200)),
    ("content", FieldRule::text().required()),
    ("overall_rating", FieldRule::integer().required().range(RATING_MIN, RATING_MAX)),
    ("work_life_balance", SUB_RATING),
    ("compensation", SUB_RATING),
    ("management", SUB_RATING),
    ("career_growth", SUB_RATING),
    ("years_experience", FieldRule::integer().required().range(0, 50)),
    ("employment_status", FieldRule::text().required().choices(EmploymentStatus::CHOICES)),
];

/// Set by the server; clients may not send them.
pub const REVIEW_READ_ONLY: &[&str] = &["created_at", "is_verified"];

pub const REVIEW_RENAMES: &[(&str, &str)] = &[("airline", "airline_id")];

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewOut {
    pub id: i64,
    pub airline: i64,
    pub airline_name: String,
    pub position: Position,
    pub title: String,
    pub content: String,
    pub overall_rating: i32,
    pub work_life_balance: Option<i32>,
    pub compensation: Option<i32>,
    pub management: Option<i32>,
    pub career_growth: Option<i32>,
    pub years_experience: i32,
    pub employment_status: EmploymentStatus,
    pub created_at: DateTime<Utc>,
    pub is_verified: bool,
}

impl From<&AirlineReview> for ReviewOut {
    fn from(r: &AirlineReview) -> Self {
        ReviewOut {
            id: r.id,
            airline: r.airline_id,
            airline_name: r.airline_name.clone(),
            position: r.position,
            title: r.title.clone(),
            content: r.content.clone(),
            overall_rating: r.overall_rating,
            work_life_balance: r.work_life_balance,
            compensation: r.compensation,
            management: r.management,
            career_growth: r.career_growth,
            years_experience: r.years_experience,
            employment_status: r.employment_status,
            created_at: r.created_at,
            is_verified: r.is_verified,
        }
    }
}
