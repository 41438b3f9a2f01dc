use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message exchanged within a process. Never updated after insert.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct History {
    pub id: i64,
    pub process_id: i64,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub role_as: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHistory {
    pub process_id: i64,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub role_as: String,
    /// Defaults to the insertion time. Set only when importing old records.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
