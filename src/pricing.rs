//! Pricing
//!
//! Money arithmetic shared by the catalog, cart and checkout. Amounts are handled in minor
//! units (`i64`) so totals are exact and only percentages need rounding.

use std::str::FromStr;

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors that can occur while parsing prices or computing totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// The price string was not `"<amount> <currency code>"` with a valid decimal amount.
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// The currency code is not a known ISO currency.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// The amount has more decimal places than the currency allows.
    #[error("price {0} is more precise than its currency allows")]
    ExcessPrecision(String),

    /// Prices cannot be negative.
    #[error("price {0} is negative")]
    NegativePrice(String),

    /// Minor unit arithmetic overflowed.
    #[error("amount overflowed while computing totals")]
    Overflow,

    /// Percentage calculation could not be represented in minor units.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Parse a price such as `"78.00 PHP"` into minor units and its currency.
///
/// # Errors
///
/// - [`PricingError::InvalidPrice`]: the string is not an amount followed by a currency code.
/// - [`PricingError::UnknownCurrency`]: the code is not an ISO currency.
/// - [`PricingError::ExcessPrecision`]: e.g. `"1.005 PHP"`.
/// - [`PricingError::NegativePrice`]: the amount is below zero.
pub fn parse_price(price: &str) -> Result<(i64, &'static Currency), PricingError> {
    let (amount, code) = price
        .trim()
        .split_once(' ')
        .ok_or_else(|| PricingError::InvalidPrice(price.to_string()))?;

    let currency =
        iso::find(code.trim()).ok_or_else(|| PricingError::UnknownCurrency(code.to_string()))?;

    let mut amount = Decimal::from_str(amount.trim())
        .map_err(|_err| PricingError::InvalidPrice(price.to_string()))?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::NegativePrice(price.to_string()));
    }

    if amount.normalize().scale() > currency.exponent {
        return Err(PricingError::ExcessPrecision(price.to_string()));
    }

    amount.rescale(currency.exponent);

    let minor = i64::try_from(amount.mantissa()).map_err(|_err| PricingError::Overflow)?;

    Ok((minor, currency))
}

/// Price of `quantity` units at `unit_price`.
///
/// # Errors
///
/// Returns [`PricingError::Overflow`] if the product does not fit in minor units.
pub fn line_total<'a>(
    unit_price: &Money<'a, Currency>,
    quantity: u32,
) -> Result<Money<'a, Currency>, PricingError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PricingError::Overflow)?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Sum a list of amounts, starting from zero in `currency`.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if any amount is in a different currency.
pub fn total_price<'a>(
    amounts: impl IntoIterator<Item = Money<'a, Currency>>,
    currency: &'a Currency,
) -> Result<Money<'a, Currency>, PricingError> {
    let total = amounts
        .into_iter()
        .try_fold(Money::from_minor(0, currency), |acc, amount| acc.add(amount))?;

    Ok(total)
}

/// Calculate `percent` of a minor unit amount, rounding half away from zero.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] if the result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let fraction = *percent * Decimal::ONE;

    let applied = fraction
        .checked_mul(Decimal::from(minor))
        .ok_or(PricingError::PercentConversion)?;

    applied
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}
