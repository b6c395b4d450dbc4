//! Glaze
//!
//! Glaze is the cart and checkout core of a bakery storefront: a product catalog, a cart
//! store with merge-on-add line items, derived order totals with a promo code and a delivery
//! fee, a mock sign-in session and a printable order summary.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod session;
pub mod tags;
pub mod utils;
