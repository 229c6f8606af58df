use crate::db;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{get, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "List products.")]
#[get("")]
pub async fn list_handler(pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    db::product::fetch_all(pg_pool.get_ref())
        .await
        .map(|products| JsonResponse::build().set_list(products).ok("OK"))
        .map_err(|err| {
            tracing::error!("Failed to fetch products: {:?}", err);
            JsonResponse::<models::Product>::build().internal_server_error("")
        })
}

#[tracing::instrument(name = "Get product by slug.")]
#[get("/{slug}")]
pub async fn item_handler(
    path: web::Path<(String,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let slug = path.into_inner().0;
    let product = db::product::fetch_by_slug(pg_pool.get_ref(), &slug)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch product: {:?}", err);
            JsonResponse::<models::Product>::build().internal_server_error("")
        })?
        .ok_or_else(|| JsonResponse::<models::Product>::build().not_found("Product not found"))?;

    Ok(JsonResponse::build().set_id(product.id).set_item(product).ok("OK"))
}

#[tracing::instrument(name = "List categories.")]
#[get("/meta/categories")]
pub async fn categories_handler(pg_pool: web::Data<PgPool>) -> Result<impl Responder> {
    use crate::services::{Catalog, PgCatalog};

    let catalog = PgCatalog::new(pg_pool.get_ref().clone());
    let categories = catalog.categories().await;

    Ok(JsonResponse::build().set_list(categories).ok("OK"))
}

#[tracing::instrument(name = "List products by category.")]
#[get("/category/{category}")]
pub async fn category_handler(
    path: web::Path<(String,)>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    use crate::services::{Catalog, PgCatalog};

    let category = path.into_inner().0;
    let catalog = PgCatalog::new(pg_pool.get_ref().clone());
    let products = catalog.by_category(&category, 20).await;

    Ok(JsonResponse::build().set_list(products).ok("OK"))
}
