use crate::models::{Cart, CartItem};
use sqlx::PgPool;

/// Cart line joined with the product it references.
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct CartItemDetail {
    pub id: i32,
    pub quantity: i32,
    pub product_id: i32,
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub image_url: Option<String>,
}

pub async fn get_or_create(pool: &PgPool, cart_code: &str) -> Result<(Cart, bool), sqlx::Error> {
    let inserted = sqlx::query_as::<_, Cart>(
        r#"INSERT INTO carts (cart_code)
           VALUES ($1)
           ON CONFLICT (cart_code) DO NOTHING
           RETURNING *"#,
    )
    .bind(cart_code)
    .fetch_optional(pool)
    .await?;

    if let Some(cart) = inserted {
        return Ok((cart, true));
    }

    let cart = sqlx::query_as::<_, Cart>(r#"SELECT * FROM carts WHERE cart_code = $1"#)
        .bind(cart_code)
        .fetch_one(pool)
        .await?;

    Ok((cart, false))
}

pub async fn fetch_unpaid(pool: &PgPool, cart_code: &str) -> Result<Option<Cart>, sqlx::Error> {
    sqlx::query_as::<_, Cart>(r#"SELECT * FROM carts WHERE cart_code = $1 AND paid = FALSE"#)
        .bind(cart_code)
        .fetch_optional(pool)
        .await
}

/// Adding an item that is already in the cart resets its quantity to one.
pub async fn upsert_item(
    pool: &PgPool,
    cart_id: i32,
    product_id: i32,
) -> Result<CartItem, sqlx::Error> {
    sqlx::query_as::<_, CartItem>(
        r#"INSERT INTO cart_items (cart_id, product_id, quantity)
           VALUES ($1, $2, 1)
           ON CONFLICT (cart_id, product_id) DO UPDATE SET quantity = 1
           RETURNING *"#,
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_one(pool)
    .await
}

pub async fn item_exists(
    pool: &PgPool,
    cart_id: i32,
    product_id: i32,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(
        r#"SELECT EXISTS (SELECT 1 FROM cart_items WHERE cart_id = $1 AND product_id = $2)"#,
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_one(pool)
    .await
}

pub async fn update_quantity(
    pool: &PgPool,
    item_id: i32,
    quantity: i32,
) -> Result<Option<CartItem>, sqlx::Error> {
    sqlx::query_as::<_, CartItem>(
        r#"UPDATE cart_items SET quantity = $1 WHERE id = $2 RETURNING *"#,
    )
    .bind(quantity)
    .bind(item_id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_item(pool: &PgPool, item_id: i32) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM cart_items WHERE id = $1"#)
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn items_detailed(
    pool: &PgPool,
    cart_id: i32,
) -> Result<Vec<CartItemDetail>, sqlx::Error> {
    sqlx::query_as::<_, CartItemDetail>(
        r#"SELECT ci.id, ci.quantity, p.id AS product_id, p.name, p.slug, p.price, p.image_url
           FROM cart_items ci
           JOIN products p ON p.id = ci.product_id
           WHERE ci.cart_id = $1
           ORDER BY ci.id"#,
    )
    .bind(cart_id)
    .fetch_all(pool)
    .await
}
