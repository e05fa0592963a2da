use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Insert body for the `predictions` table.
#[derive(Debug, Clone, Serialize)]
pub struct NewPrediction {
    pub user_id: Uuid,
    pub disease: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

/// Persisted past prediction. Created by the backend on insert; never
/// mutated or deleted by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub user_id: Uuid,
    pub disease: String,
    pub pdf_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
