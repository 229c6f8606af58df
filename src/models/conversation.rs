use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: Uuid,
    pub session_id: String,
    pub user_id: Option<String>,
    pub user_location: Option<String>,
    pub source_page: Option<String>,
    pub browser_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Client metadata captured when a conversation is first created.
#[derive(Debug, Clone, Default)]
pub struct ClientMeta {
    pub user_location: Option<String>,
    pub source_page: Option<String>,
    pub browser_info: Option<String>,
}

impl Conversation {
    /// In-memory stand-in used when the store cannot be reached, so a chat
    /// turn can still be answered even if its history is lost.
    pub fn detached(session_id: &str) -> Self {
        let now = Utc::now();
        Conversation {
            id: Uuid::new_v4(),
            session_id: session_id.to_string(),
            user_id: None,
            user_location: None,
            source_page: None,
            browser_info: None,
            created_at: now,
            last_updated: now,
        }
    }
}
