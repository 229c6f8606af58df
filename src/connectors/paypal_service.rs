use super::config::{ConnectorConfig, PayPalConnectorConfig};
use super::errors::ConnectorError;
use actix_web::web;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

#[derive(Debug, Clone)]
pub struct PayPalPaymentRequest {
    pub total: f64,
    pub currency: String,
    pub return_url: String,
    pub cancel_url: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct CreatedPayment {
    pub payment_id: String,
    pub approval_url: String,
}

#[async_trait]
pub trait PayPalConnector: Send + Sync {
    async fn create_payment(
        &self,
        request: &PayPalPaymentRequest,
    ) -> Result<CreatedPayment, ConnectorError>;
    /// Executes an approved payment; this is what actually captures funds.
    async fn execute_payment(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<(), ConnectorError>;
}

pub struct PayPalClient {
    base_url: String,
    client_id: String,
    client_secret: String,
    http_client: reqwest::Client,
}

impl PayPalClient {
    pub fn new(config: &PayPalConnectorConfig) -> Result<Self, ConnectorError> {
        let client_id = config.client_id.clone().ok_or_else(|| {
            ConnectorError::Internal("PayPal client id is not configured".to_string())
        })?;
        let client_secret = config.client_secret.clone().ok_or_else(|| {
            ConnectorError::Internal("PayPal client secret is not configured".to_string())
        })?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
            http_client,
        })
    }

    async fn access_token(&self) -> Result<String, ConnectorError> {
        let response = self
            .http_client
            .post(format!("{}/v1/oauth2/token", self.base_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::Unauthorized(format!(
                "PayPal token error {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        payload["access_token"]
            .as_str()
            .map(|token| token.to_string())
            .ok_or_else(|| {
                ConnectorError::InvalidResponse("No access_token in payload".to_string())
            })
    }
}

#[async_trait]
impl PayPalConnector for PayPalClient {
    async fn create_payment(
        &self,
        request: &PayPalPaymentRequest,
    ) -> Result<CreatedPayment, ConnectorError> {
        let token = self.access_token().await?;
        let total = format!("{:.2}", request.total);

        let body = serde_json::json!({
            "intent": "sale",
            "payer": { "payment_method": "paypal" },
            "redirect_urls": {
                "return_url": request.return_url,
                "cancel_url": request.cancel_url
            },
            "transactions": [{
                "item_list": {
                    "items": [{
                        "name": "Cart Items",
                        "sku": "cart",
                        "price": total,
                        "currency": request.currency,
                        "quantity": 1
                    }]
                },
                "amount": {
                    "total": total,
                    "currency": request.currency
                },
                "description": request.description
            }]
        });

        let span = tracing::info_span!("paypal_create_payment");
        let response = self
            .http_client
            .post(format!("{}/v1/payments/payment", self.base_url))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .instrument(span)
            .await?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        if !status.is_success() {
            return Err(ConnectorError::HttpError(format!(
                "PayPal error {}: {}",
                status, payload
            )));
        }

        let payment_id = payload["id"]
            .as_str()
            .map(|id| id.to_string())
            .ok_or_else(|| ConnectorError::InvalidResponse("No payment id".to_string()))?;

        let approval_url = payload["links"]
            .as_array()
            .and_then(|links| {
                links.iter().find(|link| {
                    link["rel"].as_str() == Some("approval_url")
                })
            })
            .and_then(|link| link["href"].as_str())
            .map(|href| href.to_string())
            .ok_or_else(|| {
                ConnectorError::InvalidResponse("No approval_url in payment links".to_string())
            })?;

        Ok(CreatedPayment {
            payment_id,
            approval_url,
        })
    }

    async fn execute_payment(
        &self,
        payment_id: &str,
        payer_id: &str,
    ) -> Result<(), ConnectorError> {
        let token = self.access_token().await?;

        let span = tracing::info_span!("paypal_execute_payment", payment_id);
        let response = self
            .http_client
            .post(format!(
                "{}/v1/payments/payment/{}/execute",
                self.base_url, payment_id
            ))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "payer_id": payer_id }))
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::HttpError(format!(
                "PayPal execute error {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Initialize the PayPal connector from app settings.
pub fn init(connector_config: &ConnectorConfig) -> web::Data<Arc<dyn PayPalConnector>> {
    let connector: Arc<dyn PayPalConnector> = if let Some(config) =
        connector_config.paypal.as_ref().filter(|cfg| cfg.enabled)
    {
        let mut cfg = config.clone();
        if cfg.client_id.is_none() {
            cfg.client_id = std::env::var("PAYPAL_CLIENT_ID").ok();
        }
        if cfg.client_secret.is_none() {
            cfg.client_secret = std::env::var("PAYPAL_CLIENT_SECRET").ok();
        }

        match PayPalClient::new(&cfg) {
            Ok(client) => {
                tracing::info!("PayPal connector initialized ({})", cfg.base_url);
                Arc::new(client)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Failed to initialize PayPal connector, falling back to mock"
                );
                Arc::new(mock::MockPayPalConnector::default())
            }
        }
    } else {
        tracing::warn!("PayPal connector disabled - using mock responses");
        Arc::new(mock::MockPayPalConnector::default())
    };

    web::Data::new(connector)
}

pub mod mock {
    use super::*;

    #[derive(Default)]
    pub struct MockPayPalConnector;

    #[async_trait]
    impl PayPalConnector for MockPayPalConnector {
        async fn create_payment(
            &self,
            _request: &PayPalPaymentRequest,
        ) -> Result<CreatedPayment, ConnectorError> {
            Ok(CreatedPayment {
                payment_id: "PAY-MOCK-0001".to_string(),
                approval_url: "https://www.sandbox.paypal.test/checkout/approve".to_string(),
            })
        }

        async fn execute_payment(
            &self,
            _payment_id: &str,
            _payer_id: &str,
        ) -> Result<(), ConnectorError> {
            Ok(())
        }
    }
}
