use crate::models::Product;
use sqlx::PgPool;

pub async fn search_by_text(
    pool: &PgPool,
    query: &str,
    limit: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    let pattern = format!("%{}%", query);

    // Name/description hits first, then category hits, without duplicates.
    let name_matches = sqlx::query_as::<_, Product>(
        r#"SELECT * FROM products
           WHERE name ILIKE $1 OR description ILIKE $1
           ORDER BY id"#,
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    let category_matches = sqlx::query_as::<_, Product>(
        r#"SELECT * FROM products WHERE category ILIKE $1 ORDER BY id"#,
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    let mut combined = name_matches;
    for product in category_matches {
        if !combined.iter().any(|p| p.id == product.id) {
            combined.push(product);
        }
    }
    combined.truncate(limit as usize);

    Ok(combined)
}

pub async fn fetch_featured(pool: &PgPool, limit: i64) -> Result<Vec<Product>, sqlx::Error> {
    // Most recent products double as the featured set.
    sqlx::query_as::<_, Product>(r#"SELECT * FROM products ORDER BY id DESC LIMIT $1"#)
        .bind(limit)
        .fetch_all(pool)
        .await
}

pub async fn fetch_by_category(
    pool: &PgPool,
    category: &str,
    limit: i64,
) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"SELECT * FROM products WHERE category = $1 ORDER BY id LIMIT $2"#,
    )
    .bind(category)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn fetch_by_id(pool: &PgPool, id: i32) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(r#"SELECT * FROM products WHERE id = $1"#)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_exact_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(r#"SELECT * FROM products WHERE name ILIKE $1 LIMIT 1"#)
        .bind(name)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_by_partial_name(
    pool: &PgPool,
    name: &str,
) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(
        r#"SELECT * FROM products WHERE name ILIKE $1 ORDER BY id LIMIT 1"#,
    )
    .bind(format!("%{}%", name))
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(r#"SELECT * FROM products WHERE slug = $1"#)
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn fetch_all(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as::<_, Product>(r#"SELECT * FROM products ORDER BY id"#)
        .fetch_all(pool)
        .await
}

pub async fn fetch_categories(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(r#"SELECT DISTINCT category FROM products ORDER BY category"#)
        .fetch_all(pool)
        .await
}
