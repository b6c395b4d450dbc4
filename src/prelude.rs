//! Glaze prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartLine, LineKey},
    catalog::{Catalog, CatalogError},
    checkout::{
        CheckoutError, OrderConfirmation, OrderTotals, PreparationWindow, PricingPolicy,
        PromoCode, PromoOutcome, ShippingPolicy, compute_totals, confirm_order,
    },
    config::{ConfigError, StorefrontConfig},
    pricing::PricingError,
    products::{Category, Product, ProductKey, ProductPricing, Size},
    receipt::{Receipt, ReceiptError},
    session::{Session, SessionError, User},
    tags::Tags,
};
