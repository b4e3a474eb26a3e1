use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named, user-curated collection of matches.
///
/// Holds match ids only. A deleted match leaves its id behind; readers
/// resolve ids against the current catalog and skip the ones that are gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserList {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub match_ids: Vec<u32>,
    pub created_at: DateTime<Utc>,
}

impl UserList {
    pub(crate) fn new(name: &str, description: Option<&str>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_owned(),
            description: clean_description(description),
            match_ids: Vec::new(),
            created_at,
        }
    }

    /// Add a match id. Returns `false` if it was already present.
    pub fn add(&mut self, match_id: u32) -> bool {
        if self.contains(match_id) {
            return false;
        }
        self.match_ids.push(match_id);
        true
    }

    /// Remove a match id. Returns `false` if it was not present.
    pub fn remove(&mut self, match_id: u32) -> bool {
        let before = self.match_ids.len();
        self.match_ids.retain(|id| *id != match_id);
        self.match_ids.len() != before
    }

    pub fn contains(&self, match_id: u32) -> bool {
        self.match_ids.contains(&match_id)
    }
}

fn clean_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_owned)
}
