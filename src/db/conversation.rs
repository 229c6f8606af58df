use crate::models::{ClientMeta, Conversation};
use sqlx::PgPool;
use tracing::Instrument;

/// Atomic get-or-create keyed by session id. Two concurrent first messages
/// of the same session must not create two conversations; the conditional
/// insert resolves the race in the database.
pub async fn get_or_create(
    pool: &PgPool,
    session_id: &str,
    user_id: Option<&str>,
    meta: &ClientMeta,
) -> Result<(Conversation, bool), sqlx::Error> {
    let query_span = tracing::info_span!("Get or create conversation.");

    let inserted = sqlx::query_as::<_, Conversation>(
        r#"INSERT INTO conversations (session_id, user_id, user_location, source_page, browser_info)
           VALUES ($1, $2, $3, $4, $5)
           ON CONFLICT (session_id) DO NOTHING
           RETURNING *"#,
    )
    .bind(session_id)
    .bind(user_id)
    .bind(&meta.user_location)
    .bind(&meta.source_page)
    .bind(&meta.browser_info)
    .fetch_optional(pool)
    .instrument(query_span)
    .await?;

    if let Some(conversation) = inserted {
        return Ok((conversation, true));
    }

    let mut conversation =
        sqlx::query_as::<_, Conversation>(r#"SELECT * FROM conversations WHERE session_id = $1"#)
            .bind(session_id)
            .fetch_one(pool)
            .await?;

    // Attach the user to an anonymous conversation once they authenticate.
    if let (Some(uid), None) = (user_id, conversation.user_id.as_deref()) {
        sqlx::query(r#"UPDATE conversations SET user_id = $1 WHERE id = $2"#)
            .bind(uid)
            .bind(conversation.id)
            .execute(pool)
            .await?;
        conversation.user_id = Some(uid.to_string());
    }

    Ok((conversation, false))
}
