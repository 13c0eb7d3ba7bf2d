//! Airline projections: summary for collections, full for writes, detail for single retrieval.

use super::review::ReviewOut;
use crate::derived::{average_rating, review_count, RegionName};
use crate::model::airline::{Airline, FOUNDED_YEAR_MAX, FOUNDED_YEAR_MIN};
use crate::model::AirlineReview;
use crate::service::validation::{FieldRule, Rules};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

const MONEY: FieldRule = FieldRule::decimal(10, 2).nullable();

pub const AIRLINE_RULES: Rules = &[
    ("name", FieldRule::text().required().max_length(200)),
    ("iata_code", FieldRule::text().required().max_length(3).pattern(r"^[A-Z0-9]{2,3}$")),
    ("icao_code", FieldRule::text().required().max_length(4).pattern(r"^[A-Z0-9]{3,4}$")),
    ("callsign", FieldRule::text().required().max_length(50)),
    ("country", FieldRule::text().required().max_length(3).uppercase().pattern(r"^[A-Z]{2,3}$")),
    ("headquarters", FieldRule::text().required().max_length(200)),
    ("hub_airports", FieldRule::text().required()),
    ("destinations", FieldRule::integer().min(0)),
    ("fleet_size", FieldRule::integer().min(0)),
    ("fleet_types", FieldRule::text().required()),
    ("founded_year", FieldRule::integer().required().range(FOUNDED_YEAR_MIN, FOUNDED_YEAR_MAX)),
    ("website", FieldRule::url().nullable().max_length(200)),
    ("logo_url", FieldRule::url().nullable().max_length(200)),
    ("is_hiring", FieldRule::boolean()),
    ("hiring_regions", FieldRule::text().blank()),
    ("pilot_requirements", FieldRule::text().blank()),
    ("pilot_salary_min", MONEY),
    ("pilot_salary_max", MONEY),
    ("cabin_crew_requirements", FieldRule::text().blank()),
    ("cabin_crew_salary_min", MONEY),
    ("cabin_crew_salary_max", MONEY),
    ("benefits", FieldRule::text().blank()),
    ("training_programs", FieldRule::text().blank()),
    ("contact_hr", FieldRule::email().nullable().max_length(254)),
];

#[derive(Debug, Serialize, ToSchema)]
pub struct AirlineSummary {
    pub id: i64,
    pub name: String,
    pub iata_code: String,
    pub icao_code: String,
    pub country: String,
    pub country_name: String,
    pub headquarters: String,
    pub hub_airports_list: Vec<String>,
    pub fleet_size: i32,
    pub fleet_types_list: Vec<String>,
    pub destinations: i32,
    pub is_hiring: bool,
    pub hiring_regions_list: Vec<RegionName>,
    pub pilot_salary_min: Option<Decimal>,
    pub pilot_salary_max: Option<Decimal>,
    pub logo_url: Option<String>,
}

impl From<&Airline> for AirlineSummary {
    fn from(a: &Airline) -> Self {
        AirlineSummary {
            id: a.id,
            name: a.name.clone(),
            iata_code: a.iata_code.clone(),
            icao_code: a.icao_code.clone(),
            country: a.country.clone(),
            country_name: a.country_name(),
            headquarters: a.headquarters.clone(),
            hub_airports_list: a.hub_airports_list(),
            fleet_size: a.fleet_size,
            fleet_types_list: a.fleet_types_list(),
            destinations: a.destinations,
            is_hiring: a.is_hiring,
            hiring_regions_list: a.hiring_regions_list(),
            pilot_salary_min: a.pilot_salary_min,
            pilot_salary_max: a.pilot_salary_max,
            logo_url: a.logo_url.clone(),
        }
    }
}

/// Every stored field plus the derived ones.
#[derive(Debug, Serialize, ToSchema)]
pub struct AirlineFull {
    pub id: i64,
    pub name: String,
    pub iata_code: String,
    pub icao_code: String,
    pub callsign: String,
    pub country: String,
    pub country_name: String,
    pub headquarters: String,
    pub hub_airports: String,
    pub hub_airports_list: Vec<String>,
    pub destinations: i32,
    pub fleet_size: i32,
    pub fleet_types: String,
    pub fleet_types_list: Vec<String>,
    pub founded_year: i32,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub is_hiring: bool,
    pub hiring_regions: String,
    pub hiring_regions_list: Vec<RegionName>,
    pub pilot_requirements: String,
    pub pilot_salary_min: Option<Decimal>,
    pub pilot_salary_max: Option<Decimal>,
    pub cabin_crew_requirements: String,
    pub cabin_crew_salary_min: Option<Decimal>,
    pub cabin_crew_salary_max: Option<Decimal>,
    pub benefits: String,
    pub training_programs: String,
    pub contact_hr: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<&Airline> for AirlineFull {
    fn from(a: &Airline) -> Self {
        AirlineFull {
            id: a.id,
            name: a.name.clone(),
            iata_code: a.iata_code.clone(),
            icao_code: a.icao_code.clone(),
            callsign: a.callsign.clone(),
            country: a.country.clone(),
            country_name: a.country_name(),
            headquarters: a.headquarters.clone(),
            hub_airports: a.hub_airports.clone(),
            hub_airports_list: a.hub_airports_list(),
            destinations: a.destinations,
            fleet_size: a.fleet_size,
            fleet_types: a.fleet_types.clone(),
            fleet_types_list: a.fleet_types_list(),
            founded_year: a.founded_year,
            website: a.website.clone(),
            logo_url: a.logo_url.clone(),
            is_hiring: a.is_hiring,
            hiring_regions: a.hiring_regions.clone(),
            hiring_regions_list: a.hiring_regions_list(),
            pilot_requirements: a.pilot_requirements.clone(),
            pilot_salary_min: a.pilot_salary_min,
            pilot_salary_max: a.pilot_salary_max,
            cabin_crew_requirements: a.cabin_crew_requirements.clone(),
            cabin_crew_salary_min: a.cabin_crew_salary_min,
            cabin_crew_salary_max: a.cabin_crew_salary_max,
            benefits: a.benefits.clone(),
            training_programs: a.training_programs.clone(),
            contact_hr: a.contact_hr.clone(),
            created_at: a.created_at,
            updated_at: a.updated_at,
            is_active: a.is_active,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AirlineDetail {
    #[serde(flatten)]
    pub airline: AirlineFull,
    pub reviews: Vec<ReviewOut>,
    pub average_rating: Option<f64>,
    pub review_count: usize,
}

impl AirlineDetail {
    /// `reviews` are the airline's active reviews, newest first.
    pub fn new(airline: &Airline, reviews: &[AirlineReview]) -> Self {
        AirlineDetail {
            airline: AirlineFull::from(airline),
            average_rating: average_rating(reviews.iter().map(|r| r.overall_rating)),
            review_count: review_count(reviews),
            reviews: reviews.iter().map(ReviewOut::from).collect(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_airline() -> Airline {
    use std::str::FromStr;
    let at = DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    Airline {
        id: 1,
        name: "British Airways".into(),
        iata_code: "BA".into(),
        icao_code: "BAW".into(),
        callsign: "SPEEDBIRD".into(),
        country: "GB".into(),
        headquarters: "London".into(),
        hub_airports: "LHR, LGW".into(),
        destinations: 183,
        fleet_size: 254,
        fleet_types: "A320, B777, ".into(),
        founded_year: 1974,
        website: Some("https://www.britishairways.com".into()),
        logo_url: None,
        is_hiring: true,
        hiring_regions: "GB, us".into(),
        pilot_requirements: String::new(),
        pilot_salary_min: Some(Decimal::from_str("85000.00").unwrap()),
        pilot_salary_max: None,
        cabin_crew_requirements: String::new(),
        cabin_crew_salary_min: None,
        cabin_crew_salary_max: None,
        benefits: String::new(),
        training_programs: String::new(),
        contact_hr: None,
        created_at: at,
        updated_at: at,
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::parse_input;
    use crate::service::Mode;
    use serde_json::json;

    fn body(founded_year: i64) -> serde_json::Value {
        json!({
            "name": "Test Air",
            "iata_code": "TA",
            "icao_code": "TST",
            "callsign": "TESTER",
            "country": "GB",
            "headquarters": "Leeds",
            "hub_airports": "LBA",
            "fleet_types": "A320",
            "founded_year": founded_year,
        })
    }

    #[test]
    fn founded_year_bounds() {
        assert!(parse_input(body(1899), AIRLINE_RULES, Mode::Full, &[]).is_err());
        assert!(parse_input(body(1900), AIRLINE_RULES, Mode::Full, &[]).is_ok());
        assert!(parse_input(body(2030), AIRLINE_RULES, Mode::Full, &[]).is_ok());
        assert!(parse_input(body(2031), AIRLINE_RULES, Mode::Full, &[]).is_err());
    }

    #[test]
    fn code_formats() {
        let mut b = body(1990);
        b["iata_code"] = json!("toolong");
        b["icao_code"] = json!("b@w");
        match parse_input(b, AIRLINE_RULES, Mode::Full, &[]) {
            Err(crate::error::AppError::Validation(fields)) => {
                assert!(fields.contains("iata_code"));
                assert!(fields.contains("icao_code"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn country_is_stored_uppercase() {
        let mut b = body(1990);
        b["country"] = json!("nl");
        let input = parse_input(b, AIRLINE_RULES, Mode::Full, &[]).unwrap();
        assert_eq!(input["country"], "NL");

        let mut b = body(1990);
        b["country"] = json!("n1");
        assert!(parse_input(b, AIRLINE_RULES, Mode::Full, &[]).is_err());
    }

    #[test]
    fn hubs_and_fleet_types_are_required() {
        let mut b = body(1990);
        b.as_object_mut().unwrap().remove("hub_airports");
        b["fleet_types"] = json!("  ");
        match parse_input(b, AIRLINE_RULES, Mode::Full, &[]) {
            Err(crate::error::AppError::Validation(fields)) => {
                assert_eq!(fields.get("hub_airports").unwrap()[0], "This field is required.");
                assert_eq!(fields.get("fleet_types").unwrap()[0], "This field may not be blank.");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn summary_carries_derived_fields() {
        let v = serde_json::to_value(AirlineSummary::from(&sample_airline())).unwrap();
        assert_eq!(v["country_name"], "United Kingdom");
        assert_eq!(v["hub_airports_list"], json!(["LHR", "LGW"]));
        assert_eq!(v["fleet_types_list"], json!(["A320", "B777"]));
        assert_eq!(v["hiring_regions_list"][1], json!({ "code": "us", "name": "United States" }));
        assert_eq!(v["pilot_salary_min"], "85000.00");
        assert_eq!(v["pilot_salary_max"], serde_json::Value::Null);
        assert!(v.get("callsign").is_none());
    }

    #[test]
    fn detail_flattens_and_aggregates() {
        let detail = AirlineDetail::new(&sample_airline(), &[]);
        let v = serde_json::to_value(detail).unwrap();
        assert_eq!(v["callsign"], "SPEEDBIRD");
        assert_eq!(v["review_count"], 0);
        assert_eq!(v["average_rating"], serde_json::Value::Null);
        assert_eq!(v["reviews"], json!([]));
    }
}
