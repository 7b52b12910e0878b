use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One analysis run as stored in the `sessions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub url: String,
    pub readability: String,
    pub structure: String,
    pub completeness: String,
    pub style: String,
}

/// Row listing used by "recent" views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// SQLite rowid; grows with insertion order
    pub seq: i64,
    pub session_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub seq: i64,
    pub record: SessionRecord,
}

/// Extracted page text kept next to the session row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEntry {
    pub session_id: String,
    pub url: String,
    pub content: String,
    pub readability_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}
