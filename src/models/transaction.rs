use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(rename_all = "lowercase", type_name = "varchar")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: i32,
    pub tx_ref: String,
    pub cart_id: i32,
    pub amount: f64,
    pub currency: String,
    pub user_id: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}
