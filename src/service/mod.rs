//! Repositories: one data-access type per entity over the shared SQL builder.

mod airline;
mod blog;
mod crud;
mod repository;
mod review;
mod user;
pub mod validation;

pub use airline::{AirlineRepo, AirlineStats};
pub use blog::BlogRepo;
pub use crud::CrudService;
pub use repository::{fetch_page, Assignments, Repository};
pub use review::ReviewRepo;
pub use user::{hash_password, verify_password, UserRepo};
pub use validation::{FieldRule, Mode, RequestValidator};
