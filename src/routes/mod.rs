pub mod cart;
pub mod catalog;
pub mod chat;
pub mod checkout;
pub mod health_checks;

pub use health_checks::*;
