pub(crate) mod flutterwave;
pub(crate) mod paypal;

pub use flutterwave::*;
pub use paypal::*;

/// Flat tax added to every checkout total.
pub(crate) const CHECKOUT_TAX: f64 = 4.00;
