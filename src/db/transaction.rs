use crate::models::{Transaction, TransactionStatus};
use sqlx::PgPool;

pub async fn create(
    pool: &PgPool,
    tx_ref: &str,
    cart_id: i32,
    amount: f64,
    currency: &str,
    user_id: Option<&str>,
) -> Result<Transaction, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(
        r#"INSERT INTO transactions (tx_ref, cart_id, amount, currency, user_id, status)
           VALUES ($1, $2, $3, $4, $5, $6)
           RETURNING *"#,
    )
    .bind(tx_ref)
    .bind(cart_id)
    .bind(amount)
    .bind(currency)
    .bind(user_id)
    .bind(TransactionStatus::Pending)
    .fetch_one(pool)
    .await
}

pub async fn fetch_by_ref(
    pool: &PgPool,
    tx_ref: &str,
) -> Result<Option<Transaction>, sqlx::Error> {
    sqlx::query_as::<_, Transaction>(r#"SELECT * FROM transactions WHERE tx_ref = $1"#)
        .bind(tx_ref)
        .fetch_optional(pool)
        .await
}

/// Marks the transaction completed and the cart paid in one database
/// transaction.
pub async fn complete_payment(
    pool: &PgPool,
    tx_ref: &str,
    user_id: Option<&str>,
) -> Result<Transaction, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let transaction = sqlx::query_as::<_, Transaction>(
        r#"UPDATE transactions
           SET status = $1, modified_at = NOW()
           WHERE tx_ref = $2
           RETURNING *"#,
    )
    .bind(TransactionStatus::Completed)
    .bind(tx_ref)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r#"UPDATE carts
           SET paid = TRUE, user_id = COALESCE($1, user_id), modified_at = NOW()
           WHERE id = $2"#,
    )
    .bind(user_id)
    .bind(transaction.cart_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(transaction)
}
