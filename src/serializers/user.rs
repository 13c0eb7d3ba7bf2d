//! Account projections and inputs. Password hashes and tokens never serialize.

use super::assignments;
use crate::error::AppError;
use crate::model::{Role, User, UserSettings};
use crate::service::validation::{FieldRule, Rules};
use crate::service::{hash_password, Assignments};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

pub const USERNAME_PATTERN: &str = r"^[\w.@+-]+$";

pub const ACCOUNT_RULES: Rules = &[
    ("username", FieldRule::text().required().max_length(150).pattern(USERNAME_PATTERN)),
    ("email", FieldRule::email().blank().max_length(254)),
    ("role", FieldRule::text().choices(Role::CHOICES)),
    ("bio", FieldRule::text().nullable()),
    ("avatar", FieldRule::text().nullable().max_length(100)),
    ("website", FieldRule::url().nullable().max_length(200)),
    ("country", FieldRule::country().nullable()),
];

pub const PASSWORD_REQUIRED: Rules = &[("password", FieldRule::text().required().min_length(8).max_length(128))];

pub const PASSWORD_OPTIONAL: Rules = &[("password", FieldRule::text().min_length(8).max_length(128))];

pub const SETTINGS_RULES: Rules = &[
    ("receive_newsletter", FieldRule::boolean()),
    ("dark_mode", FieldRule::boolean()),
];

pub const LOGIN_RULES: Rules = &[
    ("username", FieldRule::text().required()),
    ("password", FieldRule::text().required()),
];

/// Account columns from a validated body, with a plain `password` replaced by its hash.
pub fn account_assignments(body: &Map<String, Value>) -> Result<Assignments, AppError> {
    let mut values = assignments(body, ACCOUNT_RULES, &[])?;
    if let Some(password) = body.get("password").and_then(Value::as_str) {
        values.push(("password_hash", hash_password(password)?.into()));
    }
    Ok(values)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SettingsOut {
    pub receive_newsletter: bool,
    pub dark_mode: bool,
}

impl From<&UserSettings> for SettingsOut {
    fn from(s: &UserSettings) -> Self {
        SettingsOut {
            receive_newsletter: s.receive_newsletter,
            dark_mode: s.dark_mode,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserPublic {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub date_joined: DateTime<Utc>,
}

impl From<&User> for UserPublic {
    fn from(u: &User) -> Self {
        UserPublic {
            id: u.id,
            username: u.username.clone(),
            role: u.role,
            bio: u.bio.clone(),
            avatar: u.avatar.clone(),
            website: u.website.clone(),
            country: u.country.clone(),
            country_name: u.country.as_deref().map(crate::country::country_name),
            date_joined: u.date_joined,
        }
    }
}

/// What a user sees about themselves.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserSelf {
    #[serde(flatten)]
    pub profile: UserPublic,
    pub email: String,
    pub settings: Option<SettingsOut>,
}

impl UserSelf {
    pub fn new(user: &User, settings: Option<&UserSettings>) -> Self {
        UserSelf {
            profile: UserPublic::from(user),
            email: user.email.clone(),
            settings: settings.map(SettingsOut::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializers::parse_input;
    use crate::service::{verify_password, Mode};
    use crate::sql::SqlParam;
    use serde_json::json;

    fn sample_user() -> User {
        User {
            id: 5,
            username: "ops.lead".into(),
            email: "ops@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Moderator,
            bio: None,
            avatar: None,
            website: None,
            country: Some("AE".into()),
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn public_projection_hides_private_fields() {
        let v = serde_json::to_value(UserPublic::from(&sample_user())).unwrap();
        assert_eq!(v["role"], "moderator");
        assert_eq!(v["country_name"], "United Arab Emirates");
        assert!(v.get("email").is_none());
        assert!(v.get("password_hash").is_none());
    }

    #[test]
    fn self_projection_adds_email_and_settings() {
        let settings = UserSettings {
            id: 1,
            user_id: 5,
            receive_newsletter: true,
            dark_mode: false,
        };
        let v = serde_json::to_value(UserSelf::new(&sample_user(), Some(&settings))).unwrap();
        assert_eq!(v["email"], "ops@example.com");
        assert_eq!(v["settings"]["receive_newsletter"], true);
        assert_eq!(v["username"], "ops.lead");
        assert!(v.get("password_hash").is_none());
    }

    #[test]
    fn registration_rules() {
        let body = json!({ "username": "bad name!", "password": "short", "country": "XX" });
        let mut map = match body {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        let mut errors = crate::service::RequestValidator::check(&mut map, ACCOUNT_RULES, Mode::Full);
        errors.merge(crate::service::RequestValidator::check(&mut map, PASSWORD_REQUIRED, Mode::Full));
        assert!(errors.contains("username"));
        assert!(errors.contains("password"));
        assert!(errors.contains("country"));
    }

    #[test]
    fn password_is_stored_hashed() {
        let map = parse_input(
            json!({ "username": "crew_member", "password": "long enough pw" }),
            PASSWORD_REQUIRED,
            Mode::Full,
            &[],
        )
        .unwrap();
        let values = account_assignments(&map).unwrap();
        assert_eq!(values[0], ("username", SqlParam::from("crew_member")));
        let (column, hash) = values.last().unwrap();
        assert_eq!(*column, "password_hash");
        match hash {
            SqlParam::Text(Some(phc)) => assert!(verify_password(phc, "long enough pw")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
