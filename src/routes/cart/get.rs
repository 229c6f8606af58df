use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::views;
use actix_web::{get, web, Responder, Result};
use serde_json::json;
use sqlx::PgPool;

#[tracing::instrument(name = "Get cart.")]
#[get("")]
pub async fn cart_handler(
    query: web::Query<forms::cart::CartQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let cart = db::cart::fetch_unpaid(pg_pool.get_ref(), &query.cart_code)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart: {:?}", err);
            JsonResponse::<views::CartView>::build().internal_server_error("")
        })?
        .ok_or_else(|| JsonResponse::<views::CartView>::build().not_found("Cart not found"))?;

    let items = db::cart::items_detailed(pg_pool.get_ref(), cart.id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart items: {:?}", err);
            JsonResponse::<views::CartView>::build().internal_server_error("")
        })?;

    Ok(JsonResponse::build()
        .set_id(cart.id)
        .set_item(views::build_cart_view(&cart, items))
        .ok("OK"))
}

#[tracing::instrument(name = "Get cart stat.")]
#[get("/stat")]
pub async fn stat_handler(
    query: web::Query<forms::cart::CartQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let cart = db::cart::fetch_unpaid(pg_pool.get_ref(), &query.cart_code)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart: {:?}", err);
            JsonResponse::<views::CartStat>::build().internal_server_error("")
        })?
        .ok_or_else(|| JsonResponse::<views::CartStat>::build().not_found("Cart not found"))?;

    let items = db::cart::items_detailed(pg_pool.get_ref(), cart.id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart items: {:?}", err);
            JsonResponse::<views::CartStat>::build().internal_server_error("")
        })?;

    Ok(JsonResponse::build()
        .set_id(cart.id)
        .set_item(views::build_cart_stat(&cart, &items))
        .ok("OK"))
}

#[tracing::instrument(name = "Check item in cart.")]
#[get("/item_in_cart")]
pub async fn item_in_cart_handler(
    query: web::Query<forms::cart::ItemInCartQuery>,
    pg_pool: web::Data<PgPool>,
) -> Result<impl Responder> {
    let cart = db::cart::fetch_unpaid(pg_pool.get_ref(), &query.cart_code)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart: {:?}", err);
            JsonResponse::<serde_json::Value>::build().internal_server_error("")
        })?;

    let in_cart = match cart {
        Some(cart) => db::cart::item_exists(pg_pool.get_ref(), cart.id, query.product_id)
            .await
            .map_err(|err| {
                tracing::error!("Failed to check cart item: {:?}", err);
                JsonResponse::<serde_json::Value>::build().internal_server_error("")
            })?,
        None => false,
    };

    Ok(JsonResponse::build()
        .set_item(json!({ "product_in_cart": in_cart }))
        .ok("OK"))
}
