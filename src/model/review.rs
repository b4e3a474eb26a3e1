use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's written review of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub match_id: u32,
    pub user_id: String,
    pub author: String,
    pub comment: String,
    /// Stars, 1 to 5.
    pub rating: u8,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
}

impl Review {
    pub(crate) fn new(
        match_id: u32,
        user_id: &str,
        author: &str,
        comment: &str,
        rating: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            match_id,
            user_id: user_id.to_owned(),
            author: author.to_owned(),
            comment: comment.trim().to_owned(),
            rating,
            created_at,
            likes: 0,
            dislikes: 0,
        }
    }
}
