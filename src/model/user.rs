use chrono::{DateTime, Utc};
use sqlx::FromRow;

choice_enum! {
    /// Account role. Moderators curate reviews; admins also manage airlines and users.
    Role {
        User => "user",
        Moderator => "moderator",
        Admin => "admin",
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub bio: Option<String>,
    /// Relative storage path of the avatar image.
    pub avatar: Option<String>,
    pub website: Option<String>,
    pub country: Option<String>,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "username",
        "email",
        "password_hash",
        "role",
        "bio",
        "avatar",
        "website",
        "country",
        "is_active",
        "date_joined",
    ];

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self.role, Role::Moderator | Role::Admin)
    }
}

#[derive(Clone, Debug, FromRow)]
pub struct UserSettings {
    pub id: i64,
    pub user_id: i64,
    pub receive_newsletter: bool,
    pub dark_mode: bool,
}

impl UserSettings {
    pub const COLUMNS: &'static [&'static str] = &["id", "user_id", "receive_newsletter", "dark_mode"];
}

/// Opaque API token; one per user.
#[derive(Clone, Debug, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}
