mod cart;
mod conversation;
mod message;
mod product;
mod review;
mod transaction;
pub mod user;

pub use cart::*;
pub use conversation::*;
pub use message::*;
pub use product::*;
pub use review::*;
pub use transaction::*;
pub use user::*;
