pub mod cart;
pub mod chat;
pub mod checkout;

pub use cart::*;
pub use chat::*;
pub use checkout::*;
