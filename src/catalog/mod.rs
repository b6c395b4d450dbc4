//! Catalog
//!
//! The shop's read-only product list. Products are validated when the catalog is loaded, so
//! everything downstream can rely on a product having a name, a sane rating and at least one
//! resolvable price in the catalog's currency.

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use slotmap::SlotMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    catalog::records::CatalogRecord,
    pricing::PricingError,
    products::{Category, Product, ProductKey, Size},
};

pub mod records;

/// Catalog loading and lookup errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Price parsing error
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Two products share an identifier
    #[error("duplicate product id: {0}")]
    DuplicateProduct(String),

    /// Product has a blank name
    #[error("product {0} has no name")]
    EmptyName(String),

    /// Rating is not between 0 and 5
    #[error("product {0} has invalid rating {1}")]
    InvalidRating(String, f64),

    /// Product has neither a price nor sizes
    #[error("product {0} has no price")]
    MissingPrice(String),

    /// Product has both a price and sizes
    #[error("product {0} has both a single price and sized prices")]
    AmbiguousPrice(String),

    /// Product lists the same size twice
    #[error("product {0} lists size {1} more than once")]
    DuplicateSize(String, Size),

    /// Products priced in different currencies
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Catalog contains no products, so its currency is unknown
    #[error("catalog has no products")]
    NoProducts,

    /// No product with the given identifier
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// No product for the given key
    #[error("product not found for key {0:?}")]
    MissingProduct(ProductKey),

    /// Product is not sold in the requested size
    #[error("{0} is not available in size {1}")]
    SizeUnavailable(String, Size),
}

/// Catalog
#[derive(Debug)]
pub struct Catalog<'a> {
    /// Products in catalog order; nothing is ever removed so slot order is insertion order
    products: SlotMap<ProductKey, Product<'a>>,

    /// Catalog identifier -> `SlotMap` key
    product_keys: FxHashMap<String, ProductKey>,

    /// Currency every product is priced in
    currency: &'static Currency,
}

impl Catalog<'static> {
    /// Parse and validate a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any product fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let record: CatalogRecord = serde_norway::from_str(yaml)?;

        let mut products = Vec::with_capacity(record.products.len());
        let mut currency: Option<&'static Currency> = None;

        for product_record in record.products {
            let (product, product_currency) = product_record.try_into_product()?;

            if let Some(existing) = currency
                && existing != product_currency
            {
                return Err(CatalogError::CurrencyMismatch(
                    existing.iso_alpha_code.to_string(),
                    product_currency.iso_alpha_code.to_string(),
                ));
            }

            currency = Some(product_currency);
            products.push(product);
        }

        Self::with_products(products, currency.ok_or(CatalogError::NoProducts)?)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, or see [`Catalog::from_yaml`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }
}

impl<'a> Catalog<'a> {
    /// Build a catalog from already-constructed products.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DuplicateProduct`]: two products share an identifier.
    /// - [`CatalogError::CurrencyMismatch`]: any price of a product is outside `currency`.
    /// - [`CatalogError::DuplicateSize`]: a product lists the same size twice.
    /// - [`CatalogError::MissingPrice`]: a product has an empty size table.
    pub fn with_products(
        products: impl IntoIterator<Item = Product<'a>>,
        currency: &'static Currency,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Catalog {
            products: SlotMap::with_key(),
            product_keys: FxHashMap::default(),
            currency,
        };

        for product in products {
            if catalog.product_keys.contains_key(&product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }

            check_pricing(&product, currency)?;

            let id = product.id.clone();
            let key = catalog.products.insert(product);

            catalog.product_keys.insert(id, key);
        }

        Ok(catalog)
    }

    /// Get a product by key.
    pub fn get(&self, key: ProductKey) -> Option<&Product<'a>> {
        self.products.get(key)
    }

    /// Get a product key by its catalog identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has that identifier.
    pub fn key(&self, id: &str) -> Result<ProductKey, CatalogError> {
        self.product_keys
            .get(id)
            .copied()
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    /// Get a product by its catalog identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::ProductNotFound`] if no product has that identifier.
    pub fn product(&self, id: &str) -> Result<&Product<'a>, CatalogError> {
        let key = self.key(id)?;

        self.products
            .get(key)
            .ok_or_else(|| CatalogError::ProductNotFound(id.to_string()))
    }

    /// Resolve the unit price of a product in the given size.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::MissingProduct`]: the key is not from this catalog.
    /// - [`CatalogError::SizeUnavailable`]: the product is not sold in `size`.
    pub fn price_for(
        &self,
        key: ProductKey,
        size: Size,
    ) -> Result<Money<'a, Currency>, CatalogError> {
        let product = self.get(key).ok_or(CatalogError::MissingProduct(key))?;

        product
            .pricing
            .price_for(size)
            .ok_or_else(|| CatalogError::SizeUnavailable(product.name.clone(), size))
    }

    /// Products in a category (or all products) whose name contains `query`, ignoring case.
    pub fn browse(
        &self,
        category: Option<Category>,
        query: &str,
    ) -> Vec<(ProductKey, &Product<'a>)> {
        let needle = query.trim().to_lowercase();

        self.iter()
            .filter(|(_, product)| category.is_none_or(|category| product.category == category))
            .filter(|(_, product)| product.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Products carrying `tag`.
    pub fn tagged(&self, tag: &str) -> Vec<(ProductKey, &Product<'a>)> {
        self.iter()
            .filter(|(_, product)| product.tags.contains(tag))
            .collect()
    }

    /// Other products sharing at least one tag with `key`, in catalog order.
    pub fn related(&self, key: ProductKey) -> Vec<(ProductKey, &Product<'a>)> {
        let Some(product) = self.get(key) else {
            return Vec::new();
        };

        self.iter()
            .filter(|(other, candidate)| {
                *other != key && candidate.tags.intersects(&product.tags)
            })
            .collect()
    }

    /// Iterate products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (ProductKey, &Product<'a>)> {
        self.products.iter()
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency every product is priced in.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

fn check_pricing(
    product: &Product<'_>,
    currency: &'static Currency,
) -> Result<(), CatalogError> {
    let mut seen: SmallVec<[Size; 4]> = SmallVec::new();

    for (size, price) in product.pricing.prices() {
        if price.currency() != currency {
            return Err(CatalogError::CurrencyMismatch(
                currency.iso_alpha_code.to_string(),
                price.currency().iso_alpha_code.to_string(),
            ));
        }

        if seen.contains(&size) {
            return Err(CatalogError::DuplicateSize(product.id.clone(), size));
        }

        seen.push(size);
    }

    if seen.is_empty() {
        return Err(CatalogError::MissingPrice(product.id.clone()));
    }

    Ok(())
}
