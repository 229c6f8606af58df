use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{post, web, Responder, Result};
use serde_valid::Validate;
use sqlx::PgPool;

#[tracing::instrument(name = "Add cart item.")]
#[post("/add")]
pub async fn add_handler(
    form: web::Json<forms::cart::AddItem>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    form.validate()
        .map_err(|errors| JsonResponse::<models::CartItem>::build().bad_request(errors))?;

    let product = db::product::fetch_by_id(pg_pool.get_ref(), form.product_id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch product: {:?}", err);
            JsonResponse::<models::CartItem>::build().internal_server_error("")
        })?
        .ok_or_else(|| {
            JsonResponse::<models::CartItem>::build()
                .not_found(format!("Product not found {}", form.product_id))
        })?;

    let (cart, created) = db::cart::get_or_create(pg_pool.get_ref(), &form.cart_code)
        .await
        .map_err(|err| {
            tracing::error!("Failed to get or create cart: {:?}", err);
            JsonResponse::<models::CartItem>::build().internal_server_error("")
        })?;

    if created {
        tracing::info!(cart_code = %cart.cart_code, "New cart created");
    }

    db::cart::upsert_item(pg_pool.get_ref(), cart.id, product.id)
        .await
        .map(|item| {
            JsonResponse::build()
                .set_id(item.id)
                .set_item(item)
                .ok("Cart item created successfully")
        })
        .map_err(|err| {
            tracing::error!("Failed to add cart item: {:?}", err);
            JsonResponse::<models::CartItem>::build().internal_server_error("")
        })
}
