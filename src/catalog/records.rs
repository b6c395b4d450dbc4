//! Catalog records
//!
//! The on-disk shape of a catalog and its conversion into validated [`Product`]s.

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    catalog::CatalogError,
    pricing::parse_price,
    products::{Category, Product, ProductPricing, Size},
    tags::Tags,
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct CatalogRecord {
    /// Products in display order
    pub products: Vec<ProductRecord>,
}

/// Product record from YAML
#[derive(Debug, Deserialize)]
pub struct ProductRecord {
    /// Catalog identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Shelf category
    pub category: Category,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Average rating out of 5
    #[serde(default)]
    pub rating: f64,

    /// Product tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Single price (e.g. "78.00 PHP"), for products without size options
    #[serde(default)]
    pub price: Option<String>,

    /// Per-size prices, for products with size options
    #[serde(default)]
    pub sizes: Option<Vec<SizePriceRecord>>,
}

/// A price for one size of a product
#[derive(Debug, Deserialize)]
pub struct SizePriceRecord {
    /// Size name
    pub size: Size,

    /// Price for this size (e.g. "100.00 PHP")
    pub price: String,
}

const MAX_RATING: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

impl ProductRecord {
    /// Validate the record and convert it into a product, returning the product's currency.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first invalid field.
    pub fn try_into_product(
        self,
    ) -> Result<(Product<'static>, &'static Currency), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::EmptyName(self.id));
        }

        let rating = Decimal::from_f64(self.rating)
            .map(|rating| rating.round_dp(2))
            .filter(|rating| !rating.is_sign_negative() && *rating <= MAX_RATING)
            .ok_or_else(|| CatalogError::InvalidRating(self.id.clone(), self.rating))?;

        let (pricing, currency) = match (self.price, self.sizes) {
            (Some(price), None) => {
                let (minor, currency) = parse_price(&price)?;

                (
                    ProductPricing::Single(Money::from_minor(minor, currency)),
                    currency,
                )
            }
            (None, Some(sizes)) => sized_pricing(&self.id, sizes)?,
            (None, None) => return Err(CatalogError::MissingPrice(self.id)),
            (Some(_), Some(_)) => return Err(CatalogError::AmbiguousPrice(self.id)),
        };

        let product = Product {
            id: self.id,
            name: self.name,
            category: self.category,
            description: self.description,
            rating,
            tags: Tags::from(self.tags),
            pricing,
        };

        Ok((product, currency))
    }
}

fn sized_pricing(
    id: &str,
    sizes: Vec<SizePriceRecord>,
) -> Result<(ProductPricing<'static>, &'static Currency), CatalogError> {
    let mut prices: SmallVec<[(Size, Money<'static, Currency>); 4]> = SmallVec::new();
    let mut currency: Option<&'static Currency> = None;

    for record in sizes {
        if prices.iter().any(|(size, _)| *size == record.size) {
            return Err(CatalogError::DuplicateSize(id.to_string(), record.size));
        }

        let (minor, parsed_currency) = parse_price(&record.price)?;

        if let Some(existing) = currency
            && existing != parsed_currency
        {
            return Err(CatalogError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                parsed_currency.iso_alpha_code.to_string(),
            ));
        }

        currency = Some(parsed_currency);
        prices.push((record.size, Money::from_minor(minor, parsed_currency)));
    }

    let currency = currency.ok_or_else(|| CatalogError::MissingPrice(id.to_string()))?;

    Ok((ProductPricing::Sized(prices), currency))
}
