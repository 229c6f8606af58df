use crate::configuration::Settings;
use crate::connectors::{FlutterwaveConnector, PaymentCustomer, PaymentRequest};
use crate::db;
use crate::forms;
use crate::helpers::JsonResponse;
use crate::models::user::MaybeUser;
use actix_web::{post, web, Responder, Result};
use serde_json::json;
use serde_valid::Validate;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use super::CHECKOUT_TAX;

const CURRENCY: &str = "NGN";

#[tracing::instrument(name = "Initiate Flutterwave payment.", skip(settings, connector))]
#[post("/flutterwave")]
pub async fn initiate_handler(
    user: MaybeUser,
    form: web::Json<forms::checkout::CheckoutRequest>,
    pg_pool: web::Data<PgPool>,
    settings: web::Data<Settings>,
    connector: web::Data<Arc<dyn FlutterwaveConnector>>,
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

    let request = PaymentRequest {
        tx_ref,
        amount: total_amount,
        currency: CURRENCY.to_string(),
        redirect_url: format!("{}/payment-status/", settings.frontend_base_url),
        customer: PaymentCustomer {
            email: user.email.clone().unwrap_or_default(),
            username: user.username.clone(),
            phonenumber: None,
        },
    };

    let payload = connector.initiate_payment(&request).await?;

    Ok(web::Json(payload))
}

#[tracing::instrument(name = "Flutterwave payment callback.", skip(connector))]
#[post("/flutterwave/callback")]
pub async fn callback_handler(
    user: MaybeUser,
    query: web::Query<forms::checkout::FlutterwaveCallbackQuery>,
    pg_pool: web::Data<PgPool>,
    connector: web::Data<Arc<dyn FlutterwaveConnector>>,
) -> Result<impl Responder> {
    if query.status.as_deref() != Some("successful") {
        return Err(JsonResponse::<serde_json::Value>::build()
            .bad_request("Payment was not successful"));
    }

    let transaction_id = query.transaction_id.as_deref().ok_or_else(|| {
        JsonResponse::<serde_json::Value>::build().bad_request("Missing transaction_id")
    })?;

    let transaction = db::transaction::fetch_by_ref(pg_pool.get_ref(), &query.tx_ref)
        .await
        .map_err(|err| {
            tracing::error!("Failed to fetch transaction: {:?}", err);
            JsonResponse::<serde_json::Value>::build().internal_server_error("")
        })?
        .ok_or_else(|| {
            JsonResponse::<serde_json::Value>::build().not_found("Transaction not found")
        })?;

    let verified = connector.verify_transaction(transaction_id).await?;

    let amounts_match = (verified.amount - transaction.amount).abs() < 0.01;
    if verified.status == "successful" && amounts_match && verified.currency == transaction.currency
    {
        let user_id = user.as_ref().map(|u| u.id.clone());
        let user_id = user_id.as_deref().or(transaction.user_id.as_deref());

        db::transaction::complete_payment(pg_pool.get_ref(), &transaction.tx_ref, user_id)
            .await
            .map_err(|err| {
                tracing::error!("Failed to complete payment: {:?}", err);
                JsonResponse::<serde_json::Value>::build().internal_server_error("")
            })?;

        Ok(web::Json(json!({
            "message": "Payment successful!",
            "subMessage": "You have successfully made payment for items you purchased!"
        })))
    } else {
        tracing::warn!(
            tx_ref = %transaction.tx_ref,
            "Payment verification mismatch"
        );
        Ok(web::Json(json!({
            "message": "Payment verification failed.",
            "subMessage": "Your payment verification failed."
        })))
    }
}
