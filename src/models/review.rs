use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flag raised on a bot message that received negative feedback. Reviewed
/// by a human later; never deleted by the chat flow.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReviewFlag {
    pub id: Uuid,
    pub message_id: Uuid,
    pub correct_response: Option<String>,
    pub notes: Option<String>,
    pub reviewed: bool,
    pub created_at: DateTime<Utc>,
}
