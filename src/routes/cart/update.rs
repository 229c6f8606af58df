use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models;
use actix_web::{patch, web, Responder, Result};
use serde_valid::Validate;
use sqlx::PgPool;

#[tracing::instrument(name = "Update cart item quantity.")]
#[patch("/quantity")]
pub async fn quantity_handler(
    form: web::Json<forms::cart::UpdateQuantity>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    form.validate()
        .map_err(|errors| JsonResponse::<models::CartItem>::build().bad_request(errors))?;

    let item = db::cart::update_quantity(pg_pool.get_ref(), form.item_id, form.quantity)
        .await
        .map_err(|err| {
            tracing::error!("Failed to update cart item: {:?}", err);
            JsonResponse::<models::CartItem>::build().internal_server_error("")
        })?
        .ok_or_else(|| {
            JsonResponse::<models::CartItem>::build()
                .not_found(format!("Cart item not found {}", form.item_id))
        })?;

    Ok(JsonResponse::build()
        .set_id(item.id)
        .set_item(item)
        .ok("Cart item updated successfully!"))
}
