use crate::configuration::Settings;
use crate::connectors::{PayPalConnector, PayPalPaymentRequest};
use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models::user::MaybeUser;
use actix_web::{get, post, web, Responder, Result};
use serde_json::json;
use serde_valid::Validate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::CHECKOUT_TAX;

const CURRENCY: &str = "USD";

#[tracing::instrument(name = "Initiate PayPal payment.", skip(settings, connector))]
#[post("/paypal")]
pub async fn paypal_initiate_handler(
    user: MaybeUser,
    form: web::Json<forms::checkout::CheckoutRequest>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
    connector: web::Data<Arc<dyn PayPalConnector>>,
) -> Result<impl Responder> {
    form.validate()
        .map_err(|errors| JsonResponse::<serde_json::Value>::build().bad_request(errors))?;

    let user = user.0.ok_or_else(|| {
        JsonResponse::<serde_json::Value>::build().unauthorized("Authentication required")
    })?;

    let cart = db::cart::fetch_unpaid(pg_pool.get_ref(), &form.cart_code)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart: {:?}", err);
            JsonResponse::<serde_json::Value>::build().internal_server_error("")
        })?
        .ok_or_else(|| JsonResponse::<serde_json::Value>::build().not_found("Cart not found"))?;

    let items = db::cart::items_detailed(pg_pool.get_ref(), cart.id)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch cart items: {:?}", err);
            JsonResponse::<serde_json::Value>::build().internal_server_error("")
        })?;

    let amount: f64 = items
        .iter()
        .map(|item| item.price * item.quantity as f64)
        .sum();
    let total_amount = amount + CHECKOUT_TAX;

    let tx_ref = Uuid::new_v4().to_string();
    db::transaction::create(
        pg_pool.get_ref(),
        &tx_ref,
        cart.id,
        total_amount,
        CURRENCY,
        Some(&user.id),
    )
    .await
    .map_err(|err| {
        tracing::error!("Failed to create transaction: {:?}", err);
        JsonResponse::<serde_json::Value>::build().internal_server_error("")
    })?;

    let request = PayPalPaymentRequest {
        total: total_amount,
        currency: CURRENCY.to_string(),
        return_url: format!(
            "{}/payment-status?paymentStatus=success&ref={}",
            settings.frontend_base_url, tx_ref
        ),
        cancel_url: format!(
            "{}/payment-status?paymentStatus=cancel",
            settings.frontend_base_url
        ),
        description: "Payment for cart items.".to_string(),
    };

    let created = connector.create_payment(&request).await?;
    tracing::info!(payment_id = %created.payment_id, "PayPal payment created");

    Ok(web::Json(json!({ "approval_url": created.approval_url })))
}

#[tracing::instrument(name = "PayPal payment callback.", skip(connector))]
#[get("/paypal/callback")]
pub async fn paypal_callback_handler(
    query: web::Query<forms::checkout::PayPalCallbackQuery>,
    pg_pool: web::Data<PgPool>,
    connector: web::Data<Arc<dyn PayPalConnector>>,
) -> Result<impl Responder> {
    let (payment_id, payer_id, tx_ref) = match (
        query.payment_id.as_deref(),
        query.payer_id.as_deref(),
        query.tx_ref.as_deref(),
    ) {
        (Some(payment_id), Some(payer_id), Some(tx_ref)) => (payment_id, payer_id, tx_ref),
        _ => {
            return Err(JsonResponse::<serde_json::Value>::build()
                .bad_request("Missing required parameters"))
        }
    };

    let transaction = db::transaction::fetch_by_ref(pg_pool.get_ref(), tx_ref)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch transaction: {:?}", err);
            JsonResponse::<serde_json::Value>::build().internal_server_error("")
        })?
        .ok_or_else(|| {
            JsonResponse::<serde_json::Value>::build().not_found("Transaction not found")
        })?;

    connector.execute_payment(payment_id, payer_id).await?;

    // The paying user comes from the stored transaction, not the request.
    db::transaction::complete_payment(
        pg_pool.get_ref(),
        &transaction.tx_ref,
        transaction.user_id.as_deref(),
    )
    .await
    .map_err(|err| {
        tracing::error!("Failed to complete payment: {:?}", err);
        JsonResponse::<serde_json::Value>::build().internal_server_error("")
    })?;

    Ok(web::Json(json!({
        "message": "Payment successful!",
        "subMessage": "You have successfully made payment for items you purchased!"
    })))
}
