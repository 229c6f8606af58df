use crate::db::cart::CartItemDetail;
use crate::models::Cart;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProductSummary {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub price: f64,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartItemView {
    pub id: i32,
    pub quantity: i32,
    pub product: ProductSummary,
    pub sub_total: f64,
}

impl From<CartItemDetail> for CartItemView {
    fn from(detail: CartItemDetail) -> Self {
        let sub_total = detail.price * detail.quantity as f64;
        CartItemView {
            id: detail.id,
            quantity: detail.quantity,
            product: ProductSummary {
                id: detail.product_id,
                name: detail.name,
                slug: detail.slug,
                price: detail.price,
                image_url: detail.image_url,
            },
            sub_total,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: i32,
    pub cart_code: String,
    pub items: Vec<CartItemView>,
    pub sum_total: f64,
}

#[derive(Debug, Serialize)]
pub struct CartStat {
    pub id: i32,
    pub cart_code: String,
    pub num_of_items: i64,
    pub sum_total: f64,
}

pub fn build_cart_view(cart: &Cart, items: Vec<CartItemDetail>) -> CartView {
    let items: Vec<CartItemView> = items.into_iter().map(Into::into).collect();
    let sum_total = items.iter().map(|item| item.sub_total).sum();

    CartView {
        id: cart.id,
        cart_code: cart.cart_code.clone(),
        items,
        sum_total,
    }
}

pub fn build_cart_stat(cart: &Cart, items: &[CartItemDetail]) -> CartStat {
    CartStat {
        id: cart.id,
        cart_code: cart.cart_code.clone(),
        num_of_items: items.iter().map(|item| item.quantity as i64).sum(),
        sum_total: items
            .iter()
            .map(|item| item.price * item.quantity as f64)
            .sum(),
    }
}
