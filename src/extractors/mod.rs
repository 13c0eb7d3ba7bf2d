//! Request extractors: caller identity and JSON bodies.

pub mod auth;
pub mod json;

pub use auth::{require_admin, require_moderator, require_self_or_admin, CurrentUser, MaybeUser};
pub use json::JsonBody;
