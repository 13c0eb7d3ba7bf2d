use chrono::{DateTime, Utc};
use sqlx::FromRow;

choice_enum! {
    /// Reviewer's job at the airline.
    Position {
        Pilot => "PILOT",
        CabinCrew => "CABIN_CREW",
        GroundStaff => "GROUND_STAFF",
        Maintenance => "MAINTENANCE",
        Management => "MANAGEMENT",
        Other => "OTHER",
    }
}

choice_enum! {
    EmploymentStatus {
        Current => "CURRENT",
        Former => "FORMER",
    }
}

pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

/// Review joined with the owning airline's name.
#[derive(Clone, Debug, FromRow)]
pub struct AirlineReview {
    pub id: i64,
    pub airline_id: i64,
    pub airline_name: String,
    #[sqlx(try_from = "String")]
    pub position: Position,
    pub title: String,
    pub content: String,
    pub overall_rating: i32,
    pub work_life_balance: Option<i32>,
    pub compensation: Option<i32>,
    pub management: Option<i32>,
    pub career_growth: Option<i32>,
    pub years_experience: i32,
    #[sqlx(try_from = "String")]
    pub employment_status: EmploymentStatus,
    pub created_at: DateTime<Utc>,
    pub is_verified: bool,
    pub is_active: bool,
}

impl AirlineReview {
    /// Stored columns; `airline_name` comes from the join.
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "airline_id",
        "position",
        "title",
        "content",
        "overall_rating",
        "work_life_balance",
        "compensation",
        "management",
        "career_growth",
        "years_experience",
        "employment_status",
        "created_at",
        "is_verified",
        "is_active",
    ];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_parse_and_reject() {
        assert_eq!("CABIN_CREW".parse::<Position>().unwrap(), Position::CabinCrew);
        assert_eq!(Position::GroundStaff.to_string(), "GROUND_STAFF");
        let err = "pilot".parse::<Position>().unwrap_err();
        assert_eq!(err.kind, "Position");
        assert_eq!(EmploymentStatus::try_from("FORMER".to_string()).unwrap(), EmploymentStatus::Former);
        assert_eq!(Position::CHOICES.len(), 6);
    }
}
