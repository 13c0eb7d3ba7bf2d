use crate::model::BlogPost;
use crate::service::validation::{FieldRule, Rules};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// `author` and `created_at` are set by the server and ignored on input.
pub const BLOG_RULES: Rules = &[
    ("topic", FieldRule::text().required().max_length(100)),
    ("description", FieldRule::text().required()),
];

#[derive(Debug, Serialize, ToSchema)]
pub struct BlogPostOut {
    pub id: i64,
    pub topic: String,
    pub description: String,
    pub author: i64,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
}

impl From<&BlogPost> for BlogPostOut {
    fn from(p: &BlogPost) -> Self {
        BlogPostOut {
            id: p.id,
            topic: p.topic.clone(),
            description: p.description.clone(),
            author: p.author_id,
            author_username: p.author_username.clone(),
            created_at: p.created_at,
        }
    }
}
