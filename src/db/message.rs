use crate::models::{ChatMessage, NewMessage};
use sqlx::PgPool;
use uuid::Uuid;

/// Appends a message and bumps the conversation's last_updated marker as
/// one logical unit.
pub async fn append(
    pool: &PgPool,
    conversation_id: Uuid,
    fields: &NewMessage,
) -> Result<ChatMessage, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let message = sqlx::query_as::<_, ChatMessage>(
        r#"INSERT INTO messages
               (conversation_id, content, is_bot, source, detected_intent, detected_entities, processing_time)
           VALUES ($1, $2, $3, $4, $5, $6, $7)
           RETURNING *"#,
    )
    .bind(conversation_id)
    .bind(&fields.content)
    .bind(fields.is_bot)
    .bind(fields.source)
    .bind(&fields.detected_intent)
    .bind(&fields.detected_entities)
    .bind(fields.processing_time)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(r#"UPDATE conversations SET last_updated = NOW() WHERE id = $1"#)
        .bind(conversation_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(message)
}

/// The most recent `limit` messages, oldest first.
pub async fn recent(
    pool: &PgPool,
    conversation_id: Uuid,
    limit: i64,
) -> Result<Vec<ChatMessage>, sqlx::Error> {
    let mut messages = sqlx::query_as::<_, ChatMessage>(
        r#"SELECT * FROM messages
           WHERE conversation_id = $1
           ORDER BY created_at DESC
           LIMIT $2"#,
    )
    .bind(conversation_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    messages.reverse();
    Ok(messages)
}

pub async fn fetch_bot_message(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<ChatMessage>, sqlx::Error> {
    sqlx::query_as::<_, ChatMessage>(r#"SELECT * FROM messages WHERE id = $1 AND is_bot = TRUE"#)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Feedback is the only field ever mutated after creation; last write wins.
pub async fn set_feedback(pool: &PgPool, id: Uuid, value: bool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"UPDATE messages SET feedback = $1 WHERE id = $2 AND is_bot = TRUE"#)
        .bind(value)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
