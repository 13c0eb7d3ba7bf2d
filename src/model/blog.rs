use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Blog post joined with its author's username.
#[derive(Clone, Debug, FromRow)]
pub struct BlogPost {
    pub id: i64,
    pub topic: String,
    pub description: String,
    pub author_id: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

impl BlogPost {
    /// Stored columns; `author_username` comes from the join.
    pub const COLUMNS: &'static [&'static str] = &["id", "topic", "description", "author_id", "created_at"];
}
