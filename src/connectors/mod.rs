//! External Service Connectors
//!
//! Adapters for everything this service talks to over the network: the
//! local generation service (Ollama) and the payment providers.
//!
//! ## Architecture Pattern
//!
//! 1. Define trait in `{service}.rs` → allows mocking in tests
//! 2. Implement HTTP client in same file
//! 3. Configuration in `config.rs` → enable/disable per environment
//! 4. Inject trait object into routes → routes never depend on HTTP details

pub mod config;
pub mod errors;
pub mod flutterwave_service;
pub mod ollama_service;
pub mod paypal_service;

pub use config::{ConnectorConfig, FlutterwaveConnectorConfig, PayPalConnectorConfig};
pub use errors::ConnectorError;
pub use flutterwave_service::{
    FlutterwaveClient, FlutterwaveConnector, PaymentCustomer, PaymentRequest, VerifiedPayment,
};
pub use ollama_service::{OllamaClient, OllamaConnector};
pub use paypal_service::{CreatedPayment, PayPalClient, PayPalConnector, PayPalPaymentRequest};

// Re-export init functions for convenient access
pub use flutterwave_service::init as init_flutterwave;
pub use ollama_service::init as init_ollama;
pub use paypal_service::init as init_paypal;
