use serde::{Deserialize, Serialize};

/// A club or national team from the static team directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub logo: String,
    pub country: String,
}
