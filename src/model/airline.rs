use crate::derived::{hiring_regions_with_names, split_list, RegionName};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

pub const FOUNDED_YEAR_MIN: i64 = 1900;
pub const FOUNDED_YEAR_MAX: i64 = 2030;

#[derive(Clone, Debug, FromRow)]
pub struct Airline {
    pub id: i64,
    pub name: String,
    pub iata_code: String,
    pub icao_code: String,
    pub callsign: String,
    pub country: String,
    pub headquarters: String,
    pub hub_airports: String,
    pub destinations: i32,
    pub fleet_size: i32,
    pub fleet_types: String,
    pub founded_year: i32,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub is_hiring: bool,
    pub hiring_regions: String,
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

impl Airline {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "iata_code",
        "icao_code",
        "callsign",
        "country",
        "headquarters",
        "hub_airports",
        "destinations",
        "fleet_size",
        "fleet_types",
        "founded_year",
        "website",
        "logo_url",
        "is_hiring",
        "hiring_regions",
        "pilot_requirements",
        "pilot_salary_min",
        "pilot_salary_max",
        "cabin_crew_requirements",
        "cabin_crew_salary_min",
        "cabin_crew_salary_max",
        "benefits",
        "training_programs",
        "contact_hr",
        "created_at",
        "updated_at",
        "is_active",
    ];

    pub fn country_name(&self) -> String {
        crate::country::country_name(&self.country)
    }

    pub fn hub_airports_list(&self) -> Vec<String> {
        split_list(&self.hub_airports)
    }

    pub fn fleet_types_list(&self) -> Vec<String> {
        split_list(&self.fleet_types)
    }

    pub fn hiring_regions_list(&self) -> Vec<RegionName> {
        hiring_regions_with_names(&self.hiring_regions)
    }
}

impl std::fmt::Display for Airline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.iata_code)
    }
}
