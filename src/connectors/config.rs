use serde::Deserialize;

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectorConfig {
    pub flutterwave: Option<FlutterwaveConnectorConfig>,
    pub paypal: Option<PayPalConnectorConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlutterwaveConnectorConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Falls back to the FLUTTERWAVE_SECRET_KEY environment variable.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayPalConnectorConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Falls back to PAYPAL_CLIENT_ID / PAYPAL_CLIENT_SECRET env variables.
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}
