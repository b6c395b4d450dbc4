//! Checkout
//!
//! Order totals are derived from a cart snapshot on demand and never stored. Confirming an
//! order is the only step that mutates the cart: it empties it.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    cart::Cart,
    pricing::{PricingError, percent_of_minor},
};

pub mod policy;

pub use policy::{PreparationWindow, PricingPolicy, PromoCode, PromoOutcome, ShippingPolicy};

/// Errors raised while pricing or confirming an order.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Errors bubbled up from subtotal or discount calculation.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Amounts shown in the checkout order summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals<'a> {
    /// Sum of line totals
    pub subtotal: Money<'a, Currency>,

    /// Delivery fee
    pub shipping: Money<'a, Currency>,

    /// Promo code discount
    pub discount: Money<'a, Currency>,

    /// Amount to pay: subtotal + shipping - discount
    pub total: Money<'a, Currency>,
}

impl OrderTotals<'_> {
    /// Whether delivery is free for this order.
    pub fn free_shipping(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }

    /// Whether a discount was applied.
    pub fn has_discount(&self) -> bool {
        self.discount.to_minor_units() != 0
    }
}

/// Compute the order totals for `cart` with the promo code the shopper entered.
///
/// # Errors
///
/// - [`CheckoutError::Pricing`]: a line or discount amount overflowed.
/// - [`CheckoutError::Money`]: the fee or the free-delivery threshold is priced in a different
///   currency than the cart.
pub fn compute_totals<'a>(
    cart: &Cart<'a>,
    policy: &PricingPolicy<'a>,
    promo_code: &str,
) -> Result<OrderTotals<'a>, CheckoutError> {
    let subtotal = cart.subtotal()?;
    let shipping = policy.shipping.fee_for(&subtotal)?;

    let discount_minor = match policy.promotion_for(promo_code) {
        Some(promotion) => percent_of_minor(&promotion.percentage(), subtotal.to_minor_units())?,
        None => 0,
    };

    let discount = Money::from_minor(discount_minor, subtotal.currency());
    let total = subtotal.add(shipping)?.sub(discount)?;

    debug!(%subtotal, %shipping, %discount, %total, "computed order totals");

    Ok(OrderTotals {
        subtotal,
        shipping,
        discount,
        total,
    })
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderConfirmation<'a> {
    /// Final amounts charged
    pub totals: OrderTotals<'a>,

    /// Number of units ordered
    pub item_count: u64,

    /// When the order will be ready
    pub ready_in: PreparationWindow,
}

/// Place the order: price the cart, then empty it.
///
/// # Errors
///
/// - [`CheckoutError::EmptyCart`]: there is nothing to order. The cart is left as is.
/// - Otherwise see [`compute_totals`]; the cart is only cleared once totals are known.
pub fn confirm_order<'a>(
    cart: &mut Cart<'a>,
    policy: &PricingPolicy<'a>,
    promo_code: &str,
) -> Result<OrderConfirmation<'a>, CheckoutError> {
    if cart.is_empty() {
        debug!("rejected checkout of empty cart");

        return Err(CheckoutError::EmptyCart);
    }

    let totals = compute_totals(cart, policy, promo_code)?;
    let item_count = cart.item_count();

    cart.clear();

    info!(total = %totals.total, item_count, "order confirmed");

    Ok(OrderConfirmation {
        totals,
        item_count,
        ready_in: policy.preparation,
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{GBP, PHP};
    use slotmap::SlotMap;
    use testresult::TestResult;

    use crate::products::{ProductKey, Size};

    use super::*;

    fn php(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, PHP)
    }

    fn cart_with_two_donuts() -> Result<Cart<'static>, crate::cart::CartError> {
        let mut keys = SlotMap::<ProductKey, ()>::with_key();
        let mut cart = Cart::new(PHP);

        cart.add_item(keys.insert(()), php(7800), 2, Size::Regular)?;

        Ok(cart)
    }

    #[test]
    fn totals_without_promo() -> TestResult {
        let cart = cart_with_two_donuts()?;

        let totals = compute_totals(&cart, &PricingPolicy::default(), "")?;

        assert_eq!(totals.subtotal, php(15_600));
        assert_eq!(totals.shipping, php(800));
        assert_eq!(totals.discount, php(0));
        assert_eq!(totals.total, php(16_400));
        assert!(!totals.free_shipping());
        assert!(!totals.has_discount());

        Ok(())
    }

    #[test]
    fn totals_with_promo() -> TestResult {
        let cart = cart_with_two_donuts()?;

        let totals = compute_totals(&cart, &PricingPolicy::default(), "SWEET20")?;

        assert_eq!(totals.discount, php(3120));
        assert_eq!(totals.total, php(13_280));
        assert!(totals.has_discount());

        Ok(())
    }

    #[test]
    fn wrong_case_promo_gives_no_discount() -> TestResult {
        let cart = cart_with_two_donuts()?;

        let totals = compute_totals(&cart, &PricingPolicy::default(), "sweet20")?;

        assert_eq!(totals.discount, php(0));
        assert_eq!(totals.total, php(16_400));

        Ok(())
    }

    #[test]
    fn empty_cart_totals_are_zero() -> TestResult {
        let cart = Cart::new(PHP);

        let totals = compute_totals(&cart, &PricingPolicy::default(), "SWEET20")?;

        assert_eq!(totals.subtotal, php(0));
        assert_eq!(totals.shipping, php(0));
        assert_eq!(totals.discount, php(0));
        assert_eq!(totals.total, php(0));
        assert!(totals.free_shipping());

        Ok(())
    }

    #[test]
    fn policy_in_other_currency_errors() -> TestResult {
        let cart = cart_with_two_donuts()?;
        let policy = PricingPolicy {
            shipping: ShippingPolicy::flat(Money::from_minor(500, GBP)),
            ..PricingPolicy::default()
        };

        assert!(matches!(
            compute_totals(&cart, &policy, ""),
            Err(CheckoutError::Money(MoneyError::CurrencyMismatch { .. }))
        ));

        Ok(())
    }

    #[test]
    fn threshold_in_other_currency_errors() -> TestResult {
        let cart = cart_with_two_donuts()?;
        let policy = PricingPolicy {
            shipping: ShippingPolicy {
                free_delivery_threshold: Some(Money::from_minor(100, GBP)),
                enforce_free_delivery: true,
                ..ShippingPolicy::flat(php(800))
            },
            ..PricingPolicy::default()
        };

        assert_eq!(
            compute_totals(&cart, &policy, ""),
            Err(CheckoutError::Money(MoneyError::CurrencyMismatch {
                expected: PHP.iso_alpha_code,
                actual: GBP.iso_alpha_code,
            }))
        );

        Ok(())
    }

    #[test]
    fn confirm_clears_cart() -> TestResult {
        let mut cart = cart_with_two_donuts()?;

        let confirmation = confirm_order(&mut cart, &PricingPolicy::default(), "SWEET20")?;

        assert_eq!(confirmation.totals.total, php(13_280));
        assert_eq!(confirmation.item_count, 2);
        assert_eq!(confirmation.ready_in.to_string(), "15-20 minutes");
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn confirm_empty_cart_is_rejected() {
        let mut cart = Cart::new(PHP);

        assert_eq!(
            confirm_order(&mut cart, &PricingPolicy::default(), ""),
            Err(CheckoutError::EmptyCart)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn failed_confirmation_keeps_cart() -> TestResult {
        let mut cart = cart_with_two_donuts()?;
        let policy = PricingPolicy {
            shipping: ShippingPolicy::flat(Money::from_minor(500, GBP)),
            ..PricingPolicy::default()
        };

        assert!(confirm_order(&mut cart, &policy, "").is_err());
        assert_eq!(cart.len(), 1);

        Ok(())
    }
}
