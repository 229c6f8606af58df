use crate::models::ReviewFlag;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn create(
    pool: &PgPool,
    message_id: Uuid,
    notes: &str,
) -> Result<ReviewFlag, sqlx::Error> {
    sqlx::query_as::<_, ReviewFlag>(
        r#"INSERT INTO review_flags (message_id, notes)
           VALUES ($1, $2)
           RETURNING *"#,
    )
    .bind(message_id)
    .bind(notes)
    .fetch_one(pool)
    .await
}

pub async fn count_for_message(pool: &PgPool, message_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM review_flags WHERE message_id = $1"#)
        .bind(message_id)
        .fetch_one(pool)
        .await
}
