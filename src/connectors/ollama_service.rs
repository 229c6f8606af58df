use super::errors::ConnectorError;
use crate::configuration::OllamaSettings;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Probe timeout is short and independent of the generation timeout.
const PROBE_TIMEOUT_SECS: u64 = 5;

/// Fixed sampling parameters for every completion request.
const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.9;

/// Transport to the local generation service. One availability probe plus
/// one non-streaming completion per chat turn; no retries.
#[async_trait]
pub trait OllamaConnector: Send + Sync {
    async fn is_available(&self) -> bool;
    async fn generate(&self, prompt: &str) -> Result<String, ConnectorError>;
}

pub struct OllamaClient {
    base_url: String,
    model: String,
    max_tokens: u32,
    http_client: reqwest::Client,
    probe_client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(settings: &OllamaSettings) -> Result<Self, ConnectorError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))?;

        let probe_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()
            .map_err(|err| ConnectorError::Internal(format!("HTTP client error: {}", err)))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            max_tokens: settings.max_tokens,
            http_client,
            probe_client,
        })
    }
}

#[async_trait]
impl OllamaConnector for OllamaClient {
    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.probe_client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::error!("Failed to probe generation service: {}", err);
                false
            }
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String, ConnectorError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": TEMPERATURE,
                "top_p": TOP_P,
                "max_tokens": self.max_tokens,
            }
        });

        let span = tracing::info_span!("ollama_generate", model = %self.model);
        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .instrument(span)
            .await?;

        if !response.status().is_success() {
            return Err(ConnectorError::HttpError(format!(
                "Generation service error {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|err| ConnectorError::InvalidResponse(err.to_string()))?;

        payload["response"]
            .as_str()
            .map(|text| text.to_string())
            .ok_or_else(|| {
                ConnectorError::InvalidResponse("No response field in payload".to_string())
            })
    }
}

/// Initialize the generation-service connector from app settings.
pub fn init(settings: &OllamaSettings) -> Arc<dyn OllamaConnector> {
    match OllamaClient::new(settings) {
        Ok(client) => {
            tracing::info!(
                "Generation service connector initialized ({}, model {})",
                settings.base_url,
                settings.model
            );
            Arc::new(client)
        }
        Err(err) => {
            tracing::error!(
                error = %err,
                "Failed to initialize generation connector, falling back to mock"
            );
            Arc::new(mock::MockOllamaConnector::default())
        }
    }
}

pub mod mock {
    use super::*;

    /// Canned generation backend for tests and degraded startup.
    pub struct MockOllamaConnector {
        available: bool,
        reply: Result<String, ()>,
    }

    impl Default for MockOllamaConnector {
        fn default() -> Self {
            Self {
                available: true,
                reply: Ok("Claro, con gusto te ayudo con eso. 😊".to_string()),
            }
        }
    }

    impl MockOllamaConnector {
        pub fn with_reply(reply: &str) -> Self {
            Self {
                available: true,
                reply: Ok(reply.to_string()),
            }
        }

        pub fn unavailable() -> Self {
            Self {
                available: false,
                reply: Ok(String::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                available: true,
                reply: Err(()),
            }
        }
    }

    #[async_trait]
    impl OllamaConnector for MockOllamaConnector {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn generate(&self, _prompt: &str) -> Result<String, ConnectorError> {
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(ConnectorError::HttpError(
                    "Generation service error 500 Internal Server Error".to_string(),
                )),
            }
        }
    }
}
