use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the text of a message came from.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "snake_case", type_name = "varchar")]
#[serde(rename_all = "snake_case")]
pub enum MessageSource {
    User,
    Predefined,
    Products,
    Price,
    ProductDetails,
    Assistance,
    Ollama,
    Fallback,
    Error,
    Validation,
}

impl MessageSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Predefined => "predefined",
            Self::Products => "products",
            Self::Price => "price",
            Self::ProductDetails => "product_details",
            Self::Assistance => "assistance",
            Self::Ollama => "ollama",
            Self::Fallback => "fallback",
            Self::Error => "error",
            Self::Validation => "validation",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub is_bot: bool,
    pub source: MessageSource,
    pub detected_intent: Option<String>,
    pub detected_entities: Option<serde_json::Value>,
    // true = positive, false = negative, None = no feedback yet
    pub feedback: Option<bool>,
    pub processing_time: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Field set for a message append; the id and timestamp come from the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub content: String,
    pub is_bot: bool,
    pub source: MessageSource,
    pub detected_intent: Option<String>,
    pub detected_entities: Option<serde_json::Value>,
    pub processing_time: Option<f64>,
}
