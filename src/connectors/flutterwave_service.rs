use super::config::{ConnectorConfig, FlutterwaveConnectorConfig};
use super::errors::ConnectorError;
use actix_web::web;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Clone, Serialize)]
pub struct PaymentCustomer {
    pub email: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonenumber: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentRequest {
    pub tx_ref: String,
    pub amount: f64,
    pub currency: String,
    pub redirect_url: String,
    pub customer: PaymentCustomer,
}

/// Verified state of a provider-side transaction.
#[derive(Debug, Clone)]
pub struct VerifiedPayment {
    pub status: String,
    pub amount: f64,
    pub currency: String,
}

#[async_trait]
pub trait FlutterwaveConnector: Send + Sync {
    /// Creates a hosted payment and returns the provider payload, which
    /// contains the checkout link the frontend redirects to.
    async fn initiate_payment(&self, request: &PaymentRequest) -> Result<Value, ConnectorError>;
    async fn verify_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedPayment, ConnectorError>;
}

pub struct FlutterwaveClient {
    base_url: String,
    secret_key: String,
    http_client: reqwest::Client,
}

impl FlutterwaveClient {
    pub fn new(config: &FlutterwaveConnectorConfig) -> Result<Self, ConnectorError> {
        let secret_key = config
            .secret_key
            .clone()
            .ok_or_else(|| {
                ConnectorError::Internal("Flutterwave secret key is not configured".to_string())
            })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key,
            http_client,
        })
    }
}

#[async_trait]
impl FlutterwaveConnector for FlutterwaveClient {
    async fn initiate_payment(&self, request: &PaymentRequest) -> Result<Value, ConnectorError> {
        let body = serde_json::json!({
            "tx_ref": request.tx_ref,
            "amount": format!("{:.2}", request.amount),
            "currency": request.currency,
            "redirect_url": request.redirect_url,
            "customer": request.customer,
            "customizations": {
                "title": "PulseBeat Tech Payment"
            }
        });

        let span = tracing::info_span!("flutterwave_initiate", tx_ref = %request.tx_ref);
        let response = self
            .http_client
            .post(format!("{}/v3/payments", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(ConnectorError::HttpError(format!(
                "Flutterwave error {}: {}",
                status, payload
            )))
        }
    }

    async fn verify_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<VerifiedPayment, ConnectorError> {
        let span = tracing::info_span!("flutterwave_verify", transaction_id);
        let response = self
            .http_client
            .get(format!(
                "{}/v3/transactions/{}/verify",
                self.base_url, transaction_id
            ))
            .bearer_auth(&self.secret_key)
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::HttpError(format!(
                "Flutterwave verification error {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        if payload["status"].as_str() != Some("success") {
            return Err(ConnectorError::InvalidResponse(format!(
                "Verification rejected: {}",
                payload
            )));
        }

        let data = &payload["data"];
        Ok(VerifiedPayment {
            status: data["status"].as_str().unwrap_or_default().to_string(),
            amount: data["amount"].as_f64().unwrap_or_default(),
            currency: data["currency"].as_str().unwrap_or_default().to_string(),
        })
    }
}

/// Initialize the Flutterwave connector from app settings.
pub fn init(connector_config: &ConnectorConfig) -> web::Data<Arc<dyn FlutterwaveConnector>> {
    let connector: Arc<dyn FlutterwaveConnector> = if let Some(config) = connector_config
        .flutterwave
        .as_ref()
        .filter(|cfg| cfg.enabled)
    {
        let mut cfg = config.clone();
        if cfg.secret_key.is_none() {
            cfg.secret_key = std::env::var("FLUTTERWAVE_SECRET_KEY").ok();
        }

        match FlutterwaveClient::new(&cfg) {
            Ok(client) => {
                tracing::info!("Flutterwave connector initialized ({})", cfg.base_url);
                Arc::new(client)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Failed to initialize Flutterwave connector, falling back to mock"
                );
                Arc::new(mock::MockFlutterwaveConnector::default())
            }
        }
    } else {
        tracing::warn!("Flutterwave connector disabled - using mock responses");
        Arc::new(mock::MockFlutterwaveConnector::default())
    };

    web::Data::new(connector)
}

pub mod mock {
    use super::*;

    #[derive(Default)]
    pub struct MockFlutterwaveConnector;

    #[async_trait]
    impl FlutterwaveConnector for MockFlutterwaveConnector {
        async fn initiate_payment(
            &self,
            request: &PaymentRequest,
        ) -> Result<Value, ConnectorError> {
            Ok(serde_json::json!({
                "status": "success",
                "message": "Hosted Link",
                "data": {
                    "link": format!("https://checkout.flutterwave.test/pay/{}", request.tx_ref)
                }
            }))
        }

        async fn verify_transaction(
            &self,
            _transaction_id: &str,
        ) -> Result<VerifiedPayment, ConnectorError> {
            Ok(VerifiedPayment {
                status: "successful".to_string(),
                amount: 0.0,
                currency: "NGN".to_string(),
            })
        }
    }
}
