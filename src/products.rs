//! Products

use std::{fmt, str::FromStr};

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use slotmap::new_key_type;
use smallvec::SmallVec;
use thiserror::Error;

use crate::tags::Tags;

new_key_type! {
    /// Product Key
    pub struct ProductKey;
}

/// Shelf category a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Ring and filled donuts
    Donuts,

    /// Cakes, tarts and other sweets
    Desserts,

    /// Coffee, milkshakes and other drinks
    Beverages,

    /// Croissants, turnovers and other baked goods
    Pastries,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Donuts => "DONUTS",
            Category::Desserts => "DESSERTS",
            Category::Beverages => "BEVERAGES",
            Category::Pastries => "PASTRIES",
        })
    }
}

/// A size a product can be ordered in. Part of a cart line's identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Size {
    /// The one size of a product without size options.
    #[default]
    Regular,

    /// Small
    Small,

    /// Medium
    Medium,

    /// Large
    Large,
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Size::Regular => "Regular",
            Size::Small => "Small",
            Size::Medium => "Medium",
            Size::Large => "Large",
        })
    }
}

/// The size name was not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown size: {0}")]
pub struct UnknownSize(pub String);

impl FromStr for Size {
    type Err = UnknownSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(Size::Regular),
            "small" => Ok(Size::Small),
            "medium" => Ok(Size::Medium),
            "large" => Ok(Size::Large),
            _ => Err(UnknownSize(s.to_string())),
        }
    }
}

/// How a product is priced.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductPricing<'a> {
    /// One price, sold in the [`Size::Regular`] size only.
    Single(Money<'a, Currency>),

    /// A price per available size, in display order.
    Sized(SmallVec<[(Size, Money<'a, Currency>); 4]>),
}

impl<'a> ProductPricing<'a> {
    /// Price for `size`, if the product is sold in that size.
    pub fn price_for(&self, size: Size) -> Option<Money<'a, Currency>> {
        match self {
            ProductPricing::Single(price) => (size == Size::Regular).then_some(*price),
            ProductPricing::Sized(prices) => prices
                .iter()
                .find(|(candidate, _)| *candidate == size)
                .map(|(_, price)| *price),
        }
    }

    /// Sizes the product is sold in.
    pub fn sizes(&self) -> SmallVec<[Size; 4]> {
        match self {
            ProductPricing::Single(_) => SmallVec::from_slice(&[Size::Regular]),
            ProductPricing::Sized(prices) => prices.iter().map(|(size, _)| *size).collect(),
        }
    }

    /// Every size the product is sold in with its price.
    pub fn prices(&self) -> SmallVec<[(Size, Money<'a, Currency>); 4]> {
        match self {
            ProductPricing::Single(price) => SmallVec::from_slice(&[(Size::Regular, *price)]),
            ProductPricing::Sized(prices) => prices.clone(),
        }
    }

    /// The lowest price across sizes, used as the "from" price on listings.
    pub fn from_price(&self) -> Option<Money<'a, Currency>> {
        match self {
            ProductPricing::Single(price) => Some(*price),
            ProductPricing::Sized(prices) => prices
                .iter()
                .map(|(_, price)| *price)
                .min_by_key(Money::to_minor_units),
        }
    }
}

/// Product
#[derive(Debug, Clone)]
pub struct Product<'a> {
    /// Catalog identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Shelf category
    pub category: Category,

    /// Short description
    pub description: String,

    /// Average rating out of 5
    pub rating: Decimal,

    /// Product tags
    pub tags: Tags,

    /// Product pricing
    pub pricing: ProductPricing<'a>,
}
