use serde::Deserialize;
use serde_valid::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct AddItem {
    #[validate(min_length = 1)]
    #[validate(max_length = 100)]
    pub cart_code: String,
    pub product_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantity {
    pub item_id: i32,
    #[validate(minimum = 1)]
    #[validate(maximum = 100)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct DeleteItem {
    pub item_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub cart_code: String,
}

#[derive(Debug, Deserialize)]
pub struct ItemInCartQuery {
    pub cart_code: String,
    pub product_id: i32,
}
