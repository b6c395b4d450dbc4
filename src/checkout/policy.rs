//! Pricing policy
//!
//! The shop-wide rules applied on top of the cart subtotal: the delivery fee, the promo code
//! and the preparation time quoted on confirmation.

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};

/// Code printed on the checkout screen.
pub const DEFAULT_PROMO_CODE: &str = "SWEET20";

/// Delivery fee and free-delivery rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy<'a> {
    /// Fee charged on any non-empty order
    pub flat_fee: Money<'a, Currency>,

    /// Subtotal above which delivery is advertised as free
    pub free_delivery_threshold: Option<Money<'a, Currency>>,

    /// Whether the advertised threshold actually waives the fee
    pub enforce_free_delivery: bool,
}

impl<'a> ShippingPolicy<'a> {
    /// A flat fee with no free-delivery threshold.
    #[must_use]
    pub const fn flat(flat_fee: Money<'a, Currency>) -> Self {
        Self {
            flat_fee,
            free_delivery_threshold: None,
            enforce_free_delivery: false,
        }
    }

    /// Delivery fee for an order with the given subtotal.
    ///
    /// Empty orders ship for free. When enforcement is on, so do orders strictly over the
    /// free-delivery threshold.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] if the fee or the threshold is priced in a
    /// different currency than `subtotal`.
    pub fn fee_for(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, MoneyError> {
        let currency = subtotal.currency();

        if self.flat_fee.currency() != currency {
            return Err(MoneyError::CurrencyMismatch {
                expected: currency.iso_alpha_code,
                actual: self.flat_fee.currency().iso_alpha_code,
            });
        }

        let over_threshold = match &self.free_delivery_threshold {
            Some(threshold) => subtotal.gt(threshold)?,
            None => false,
        };

        let free = Money::from_minor(0, currency);

        if !subtotal.is_positive() || (self.enforce_free_delivery && over_threshold) {
            return Ok(free);
        }

        Ok(self.flat_fee)
    }
}

/// A promo code and the share of the subtotal it takes off.
#[derive(Debug, Clone, PartialEq)]
pub struct PromoCode {
    code: String,
    percentage: Percentage,
}

impl PromoCode {
    /// Create a promo code.
    pub fn new(code: impl Into<String>, percentage: Percentage) -> Self {
        Self {
            code: code.into(),
            percentage,
        }
    }

    /// The literal code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Share of the subtotal discounted
    pub fn percentage(&self) -> Percentage {
        self.percentage
    }

    /// Whether `input` is this code. Matching is exact and case-sensitive.
    pub fn matches(&self, input: &str) -> bool {
        input == self.code
    }
}

/// Result of applying a promo code at checkout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromoOutcome {
    /// The code is recognised; this share of the subtotal will be discounted.
    Applied(Percentage),

    /// A code was entered but is not valid.
    Invalid,

    /// Nothing was entered.
    Blank,
}

/// Time quoted for an order to be ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreparationWindow {
    /// Earliest, in minutes
    pub min_minutes: u32,

    /// Latest, in minutes
    pub max_minutes: u32,
}

impl fmt::Display for PreparationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} minutes", self.min_minutes, self.max_minutes)
    }
}

/// All checkout pricing rules.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingPolicy<'a> {
    /// Delivery fee rules
    pub shipping: ShippingPolicy<'a>,

    /// The single recognised promo code, if any
    pub promotion: Option<PromoCode>,

    /// Quoted preparation time
    pub preparation: PreparationWindow,
}

impl PricingPolicy<'_> {
    /// Check a promo code without touching the cart.
    pub fn apply_promo_code(&self, input: &str) -> PromoOutcome {
        if input.is_empty() {
            return PromoOutcome::Blank;
        }

        match &self.promotion {
            Some(promotion) if promotion.matches(input) => {
                PromoOutcome::Applied(promotion.percentage())
            }
            _ => PromoOutcome::Invalid,
        }
    }

    /// The promotion matching `input`, if any.
    pub fn promotion_for(&self, input: &str) -> Option<&PromoCode> {
        self.promotion
            .as_ref()
            .filter(|promotion| promotion.matches(input))
    }
}

impl Default for PricingPolicy<'static> {
    /// The shop's rules: ₱8.00 delivery, free delivery advertised over ₱500.00 but not
    /// enforced, `SWEET20` for 20% off, ready in 15-20 minutes.
    fn default() -> Self {
        Self {
            shipping: ShippingPolicy {
                flat_fee: Money::from_minor(800, iso::PHP),
                free_delivery_threshold: Some(Money::from_minor(50_000, iso::PHP)),
                enforce_free_delivery: false,
            },
            promotion: Some(PromoCode::new(
                DEFAULT_PROMO_CODE,
                Percentage::from(0.2),
            )),
            preparation: PreparationWindow {
                min_minutes: 15,
                max_minutes: 20,
            },
        }
    }
}
