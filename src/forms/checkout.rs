use serde::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(min_length = 1)]
    #[validate(max_length = 100)]
    pub cart_code: String,
}

#[derive(Debug, Deserialize)]
pub struct FlutterwaveCallbackQuery {
    #[serde(default)]
    pub status: Option<String>,
    pub tx_ref: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayPalCallbackQuery {
    #[serde(default, rename = "paymentId")]
    pub payment_id: Option<String>,
    #[serde(default, rename = "PayerID")]
    pub payer_id: Option<String>,
    #[serde(default, rename = "ref")]
    pub tx_ref: Option<String>,
}
