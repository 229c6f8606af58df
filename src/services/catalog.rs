use crate::db;
use crate::models::Product;
use async_trait::async_trait;
use sqlx::PgPool;

/// Queries shorter than this fall back to the featured set.
const MIN_QUERY_LEN: usize = 3;

/// Known category labels, used to normalize loose category words and as the
/// fallback when the store cannot be queried.
const CATEGORY_LABELS: &[(&str, &str)] = &[
    ("headphones", "Headphones"),
    ("speakers", "Speakers"),
    ("streaming", "Streaming"),
];

/// Catalog lookups needed by the chat pipeline and the shop routes. Every
/// operation tolerates zero results and degrades to empty on storage
/// errors; storage failures never reach the caller.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, query: &str, limit: i64) -> Vec<Product>;
    async fn featured(&self, limit: i64) -> Vec<Product>;
    async fn by_category(&self, category: &str, limit: i64) -> Vec<Product>;
    async fn details(&self, id_or_name: &str) -> Option<Product>;
    async fn categories(&self) -> Vec<String>;
}

pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn normalize_category(category: &str) -> String {
    let lower = category.to_lowercase();
    CATEGORY_LABELS
        .iter()
        .find(|(loose, _)| *loose == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| category.to_string())
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn search(&self, query: &str, limit: i64) -> Vec<Product> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return self.featured(limit).await;
        }

        match db::product::search_by_text(&self.pool, query, limit).await {
            Ok(products) => products,
            Err(err) => {
                tracing::error!("Failed to search products: {:?}", err);
                Vec::new()
            }
        }
    }

    async fn featured(&self, limit: i64) -> Vec<Product> {
        match db::product::fetch_featured(&self.pool, limit).await {
            Ok(products) => products,
            Err(err) => {
                tracing::error!("Failed to fetch featured products: {:?}", err);
                Vec::new()
            }
        }
    }

    async fn by_category(&self, category: &str, limit: i64) -> Vec<Product> {
        let canonical = normalize_category(category);
        match db::product::fetch_by_category(&self.pool, &canonical, limit).await {
            Ok(products) => products,
            Err(err) => {
                tracing::error!("Failed to fetch products by category: {:?}", err);
                Vec::new()
            }
        }
    }

    /// Precedence: identifier match, exact name, partial name, none.
    async fn details(&self, id_or_name: &str) -> Option<Product> {
        if let Ok(id) = id_or_name.trim().parse::<i32>() {
            return match db::product::fetch_by_id(&self.pool, id).await {
                Ok(product) => product,
                Err(err) => {
                    tracing::error!("Failed to fetch product by id: {:?}", err);
                    None
                }
            };
        }

        match db::product::fetch_by_exact_name(&self.pool, id_or_name).await {
            Ok(Some(product)) => return Some(product),
            Ok(None) => {}
            Err(err) => {
                tracing::error!("Failed to fetch product by name: {:?}", err);
                return None;
            }
        }

        match db::product::fetch_by_partial_name(&self.pool, id_or_name).await {
            Ok(product) => product,
            Err(err) => {
                tracing::error!("Failed to fetch product by partial name: {:?}", err);
                None
            }
        }
    }

    async fn categories(&self) -> Vec<String> {
        match db::product::fetch_categories(&self.pool).await {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => CATEGORY_LABELS
                .iter()
                .map(|(_, canonical)| canonical.to_string())
                .collect(),
            Err(err) => {
                tracing::error!("Failed to fetch categories: {:?}", err);
                CATEGORY_LABELS
                    .iter()
                    .map(|(_, canonical)| canonical.to_string())
                    .collect()
            }
        }
    }
}

pub mod mock {
    use super::*;

    /// In-memory catalog for router and gateway tests.
    #[derive(Default)]
    pub struct MockCatalog {
        products: Vec<Product>,
    }

    impl MockCatalog {
        pub fn with_products(products: Vec<Product>) -> Self {
            Self { products }
        }
    }

    #[async_trait]
    impl Catalog for MockCatalog {
        async fn search(&self, _query: &str, limit: i64) -> Vec<Product> {
            self.products.iter().take(limit as usize).cloned().collect()
        }

        async fn featured(&self, limit: i64) -> Vec<Product> {
            self.products.iter().take(limit as usize).cloned().collect()
        }

        async fn by_category(&self, category: &str, limit: i64) -> Vec<Product> {
            let canonical = normalize_category(category);
            self.products
                .iter()
                .filter(|product| product.category == canonical)
                .take(limit as usize)
                .cloned()
                .collect()
        }

        async fn details(&self, id_or_name: &str) -> Option<Product> {
            if let Ok(id) = id_or_name.trim().parse::<i32>() {
                return self.products.iter().find(|p| p.id == id).cloned();
            }

            let needle = id_or_name.to_lowercase();
            self.products
                .iter()
                .find(|p| p.name.to_lowercase() == needle)
                .or_else(|| {
                    self.products
                        .iter()
                        .find(|p| p.name.to_lowercase().contains(&needle))
                })
                .cloned()
        }

        async fn categories(&self) -> Vec<String> {
            let mut categories: Vec<String> =
                self.products.iter().map(|p| p.category.clone()).collect();
            categories.sort();
            categories.dedup();
            categories
        }
    }
}
