pub mod cart;
pub mod conversation;
pub mod message;
pub mod product;
pub mod review;
pub mod transaction;
