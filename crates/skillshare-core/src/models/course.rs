use serde::{Deserialize, Serialize};

/// Course entry from `GET /courses/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub created_by: i64,
}

fn default_category() -> String {
    "General".to_string()
}
