use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use actix_web::{post, web, Responder, Result};
use sqlx::PgPool;

#[tracing::instrument(name = "Delete cart item.")]
#[post("/item_delete")]
pub async fn delete_handler(
    form: web::Json<forms::cart::DeleteItem>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let deleted = db::cart::delete_item(pg_pool.get_ref(), form.item_id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to delete cart item: {:?}", err);
            JsonResponse::<()>::build().internal_server_error("")
        })?;

    if deleted == 0 {
        return Err(JsonResponse::<()>::build()
            .not_found(format!("Cart item not found {}", form.item_id)));
    }

    Ok(JsonResponse::<()>::build().ok("Cart item deleted successfully!"))
}
