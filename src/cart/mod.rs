//! Cart
//!
//! The cart store: the single owner of the shopper's line items. Every mutation goes through
//! [`Cart`]'s methods; readers borrow it.
//!
//! A cart holds at most one line per `(product, size)` pair. Adding a pair that is already in
//! the cart increases that line's quantity instead of creating a second line.

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError},
    pricing::{PricingError, line_total, total_price},
    products::{ProductKey, Size},
};

new_key_type! {
    /// Cart line key
    pub struct LineKey;
}

/// Errors related to cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Items must be added in a quantity of at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// An adjustment would take a line below zero.
    #[error("line {line:?} cannot be set to quantity {quantity}")]
    NegativeQuantity {
        /// Line being adjusted
        line: LineKey,

        /// Resulting quantity that was rejected
        quantity: i64,
    },

    /// A line's quantity would exceed the supported range.
    #[error("line {0:?} quantity overflowed")]
    QuantityOverflow(LineKey),

    /// The price's currency differs from the cart currency (price currency, cart currency).
    #[error("price has currency {0}, but cart has currency {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// The unit price could not be resolved from the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// One distinct product and size in the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    key: LineKey,
    product: ProductKey,
    size: Size,
    unit_price: Money<'a, Currency>,
    quantity: u32,
}

impl<'a> CartLine<'a> {
    /// Line key
    pub fn key(&self) -> LineKey {
        self.key
    }

    /// Product this line was added from
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Size variant
    pub fn size(&self) -> Size {
        self.size
    }

    /// Unit price captured when the line was created
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Number of units, always at least 1
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price multiplied by quantity.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn total(&self) -> Result<Money<'a, Currency>, PricingError> {
        line_total(&self.unit_price, self.quantity)
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    /// Lines in the order they were first added
    lines: Vec<CartLine<'a>>,

    /// Allocator for line keys; a removed line's key is never handed out again
    keys: SlotMap<LineKey, ()>,

    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart priced in `currency`.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            keys: SlotMap::with_key(),
            currency,
        }
    }

    /// Add `quantity` units of `product` in `size`, at `unit_price` each.
    ///
    /// If the cart already has a line for this product and size, its quantity is increased
    /// and its original unit price is kept. Otherwise a new line is appended.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`]: `quantity` is zero.
    /// - [`CartError::CurrencyMismatch`]: `unit_price` is not in the cart currency.
    /// - [`CartError::QuantityOverflow`]: the merged quantity exceeds `u32::MAX`.
    pub fn add_item(
        &mut self,
        product: ProductKey,
        unit_price: Money<'a, Currency>,
        quantity: u32,
        size: Size,
    ) -> Result<LineKey, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let price_currency = unit_price.currency();

        if price_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                price_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product == product && line.size == size)
        {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow(line.key))?;

            debug!(line = ?line.key, %size, quantity = line.quantity, "merged into cart line");

            return Ok(line.key);
        }

        let key = self.keys.insert(());

        self.lines.push(CartLine {
            key,
            product,
            size,
            unit_price,
            quantity,
        });

        debug!(line = ?key, %size, quantity, %unit_price, "added cart line");

        Ok(key)
    }

    /// Add a single unit in the [`Size::Regular`] size.
    ///
    /// # Errors
    ///
    /// See [`Cart::add_item`].
    pub fn add(
        &mut self,
        product: ProductKey,
        unit_price: Money<'a, Currency>,
    ) -> Result<LineKey, CartError> {
        self.add_item(product, unit_price, 1, Size::Regular)
    }

    /// Add a product from `catalog`, resolving its unit price for `size`.
    ///
    /// # Errors
    ///
    /// - [`CartError::Catalog`]: the product is unknown or not sold in `size`.
    /// - Otherwise see [`Cart::add_item`].
    pub fn add_from_catalog(
        &mut self,
        catalog: &Catalog<'a>,
        product: ProductKey,
        quantity: u32,
        size: Size,
    ) -> Result<LineKey, CartError> {
        let unit_price = catalog.price_for(product, size)?;

        self.add_item(product, unit_price, quantity, size)
    }

    /// Replace a line's quantity. A quantity of zero removes the line.
    ///
    /// Returns the previous quantity, or `None` if no line has that key.
    pub fn update_quantity(&mut self, line: LineKey, quantity: u32) -> Option<u32> {
        if quantity == 0 {
            return self.remove_item(line).map(|removed| removed.quantity);
        }

        let entry = self.lines.iter_mut().find(|entry| entry.key == line)?;
        let previous = entry.quantity;

        entry.quantity = quantity;

        debug!(?line, previous, quantity, "updated cart line quantity");

        Some(previous)
    }

    /// Change a line's quantity by `delta`, as the checkout +/- buttons do.
    ///
    /// Returns the new quantity (zero meaning the line was removed), or `None` if no line has
    /// that key.
    ///
    /// # Errors
    ///
    /// - [`CartError::NegativeQuantity`]: the result would be below zero. The line is left
    ///   unchanged.
    /// - [`CartError::QuantityOverflow`]: the result exceeds `u32::MAX`.
    pub fn adjust_quantity(&mut self, line: LineKey, delta: i64) -> Result<Option<u32>, CartError> {
        let Some(current) = self.get(line).map(CartLine::quantity) else {
            return Ok(None);
        };

        let requested = i64::from(current)
            .checked_add(delta)
            .ok_or(CartError::QuantityOverflow(line))?;

        if requested < 0 {
            return Err(CartError::NegativeQuantity {
                line,
                quantity: requested,
            });
        }

        let quantity = u32::try_from(requested).map_err(|_err| CartError::QuantityOverflow(line))?;

        self.update_quantity(line, quantity);

        Ok(Some(quantity))
    }

    /// Remove a line, keeping the order of the remaining lines.
    ///
    /// Returns the removed line, or `None` if no line has that key.
    pub fn remove_item(&mut self, line: LineKey) -> Option<CartLine<'a>> {
        let position = self.lines.iter().position(|entry| entry.key == line)?;
        let removed = self.lines.remove(position);

        self.keys.remove(line);

        debug!(?line, "removed cart line");

        Some(removed)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.keys.clear();

        debug!("cleared cart");
    }

    /// Get a line by key.
    pub fn get(&self, line: LineKey) -> Option<&CartLine<'a>> {
        self.lines.iter().find(|entry| entry.key == line)
    }

    /// The lines in display order.
    pub fn lines(&self) -> &[CartLine<'a>] {
        &self.lines
    }

    /// Iterate over the lines in display order.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine<'a>> {
        self.lines.iter()
    }

    /// Sum of unit prices multiplied by quantities.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if the total does not fit in minor units.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        let line_totals = self
            .lines
            .iter()
            .map(CartLine::total)
            .collect::<Result<Vec<_>, _>>()?;

        total_price(line_totals, self.currency)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{PHP, USD};
    use slotmap::SlotMap;
    use testresult::TestResult;

    use super::*;

    fn products<const N: usize>() -> [ProductKey; N] {
        let mut keys = SlotMap::<ProductKey, ()>::with_key();

        std::array::from_fn(|_| keys.insert(()))
    }

    fn php(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, PHP)
    }

    #[test]
    fn new_cart_is_empty() {
        let cart = Cart::new(PHP);

        assert!(cart.is_empty());
        assert_eq!(cart.len(), 0);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.currency(), PHP);
    }

    #[test]
    fn add_appends_new_line() -> TestResult {
        let [donut] = products();
        let mut cart = Cart::new(PHP);

        let key = cart.add_item(donut, php(7800), 2, Size::Regular)?;
        let line = cart.get(key).ok_or("line missing")?;

        assert_eq!(line.product(), donut);
        assert_eq!(line.quantity(), 2);
        assert_eq!(line.size(), Size::Regular);
        assert_eq!(line.unit_price(), &php(7800));

        Ok(())
    }

    #[test]
    fn add_defaults_to_one_regular() -> TestResult {
        let [donut] = products();
        let mut cart = Cart::new(PHP);

        let key = cart.add(donut, php(7800))?;
        let line = cart.get(key).ok_or("line missing")?;

        assert_eq!(line.quantity(), 1);
        assert_eq!(line.size(), Size::Regular);

        Ok(())
    }

    #[test]
    fn repeated_adds_merge_into_one_line() -> TestResult {
        let [donut, other] = products();
        let mut cart = Cart::new(PHP);

        let first = cart.add_item(donut, php(7800), 1, Size::Regular)?;
        cart.add_item(other, php(8200), 1, Size::Regular)?;
        let second = cart.add_item(donut, php(9999), 3, Size::Regular)?;

        assert_eq!(first, second);
        assert_eq!(cart.len(), 2);

        let line = cart.get(first).ok_or("line missing")?;

        assert_eq!(line.quantity(), 4);
        assert_eq!(line.unit_price(), &php(7800), "original price is kept");

        Ok(())
    }

    #[test]
    fn sizes_are_distinct_lines() -> TestResult {
        let [coffee] = products();
        let mut cart = Cart::new(PHP);

        let small = cart.add_item(coffee, php(8000), 1, Size::Small)?;
        let large = cart.add_item(coffee, php(12_000), 1, Size::Large)?;

        assert_ne!(small, large);
        assert_eq!(cart.len(), 2);

        Ok(())
    }

    #[test]
    fn zero_quantity_add_is_rejected() {
        let [donut] = products();
        let mut cart = Cart::new(PHP);

        assert!(matches!(
            cart.add_item(donut, php(100), 0, Size::Regular),
            Err(CartError::InvalidQuantity)
        ));

        assert!(cart.is_empty());
    }

    #[test]
    fn other_currency_is_rejected() {
        let [donut] = products();
        let mut cart = Cart::new(PHP);

        assert!(matches!(
            cart.add(donut, Money::from_minor(100, USD)),
            Err(CartError::CurrencyMismatch("USD", "PHP"))
        ));

        assert!(cart.is_empty());
    }

    #[test]
    fn merge_overflow_is_rejected() -> TestResult {
        let [donut] = products();
        let mut cart = Cart::new(PHP);

        let key = cart.add_item(donut, php(100), u32::MAX, Size::Regular)?;

        assert!(matches!(
            cart.add(donut, php(100)),
            Err(CartError::QuantityOverflow(line)) if line == key
        ));
        assert_eq!(cart.get(key).map(CartLine::quantity), Some(u32::MAX));

        Ok(())
    }

    #[test]
    fn update_quantity_replaces_exactly() -> TestResult {
        let [donut] = products();
        let mut cart = Cart::new(PHP);
        let key = cart.add_item(donut, php(7800), 2, Size::Regular)?;

        assert_eq!(cart.update_quantity(key, 5), Some(2));
        assert_eq!(cart.get(key).map(CartLine::quantity), Some(5));

        Ok(())
    }

    #[test]
    fn update_to_zero_removes_line() -> TestResult {
        let [donut, other] = products();
        let mut cart = Cart::new(PHP);
        let key = cart.add(donut, php(7800))?;
        cart.add(other, php(8200))?;

        assert_eq!(cart.update_quantity(key, 0), Some(1));
        assert_eq!(cart.len(), 1);
        assert!(cart.get(key).is_none());

        assert_eq!(cart.update_quantity(key, 3), None);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn adjust_quantity_steps_up_and_down() -> TestResult {
        let [donut] = products();
        let mut cart = Cart::new(PHP);
        let key = cart.add(donut, php(7800))?;

        assert_eq!(cart.adjust_quantity(key, 1)?, Some(2));
        assert_eq!(cart.adjust_quantity(key, -1)?, Some(1));
        assert_eq!(cart.adjust_quantity(key, -1)?, Some(0));
        assert!(cart.is_empty());
        assert_eq!(cart.adjust_quantity(key, 1)?, None);

        Ok(())
    }

    #[test]
    fn negative_adjustment_is_rejected() -> TestResult {
        let [donut] = products();
        let mut cart = Cart::new(PHP);
        let key = cart.add_item(donut, php(7800), 2, Size::Regular)?;

        assert!(matches!(
            cart.adjust_quantity(key, -3),
            Err(CartError::NegativeQuantity { line, quantity: -1 }) if line == key
        ));
        assert_eq!(cart.get(key).map(CartLine::quantity), Some(2));

        Ok(())
    }

    #[test]
    fn remove_keeps_order() -> TestResult {
        let [a, b, c] = products();
        let mut cart = Cart::new(PHP);
        cart.add(a, php(100))?;
        let middle = cart.add(b, php(200))?;
        cart.add(c, php(300))?;

        let removed = cart.remove_item(middle).ok_or("line missing")?;

        assert_eq!(removed.product(), b);
        assert_eq!(
            cart.iter().map(CartLine::product).collect::<Vec<_>>(),
            vec![a, c]
        );

        Ok(())
    }

    #[test]
    fn remove_unknown_line_is_noop() -> TestResult {
        let [a, b] = products();
        let mut cart = Cart::new(PHP);
        let removed = cart.add(a, php(100))?;
        cart.add(b, php(200))?;
        cart.remove_item(removed);

        let before = cart.lines().to_vec();

        assert!(cart.remove_item(removed).is_none());
        assert!(cart.remove_item(LineKey::default()).is_none());
        assert_eq!(cart.lines(), before.as_slice());

        Ok(())
    }

    #[test]
    fn removed_keys_are_not_reused() -> TestResult {
        let [a, b] = products();
        let mut cart = Cart::new(PHP);
        let old = cart.add(a, php(100))?;
        cart.remove_item(old);

        let new = cart.add(b, php(200))?;

        assert_ne!(old, new);
        assert!(cart.get(old).is_none());

        Ok(())
    }

    #[test]
    fn clear_is_idempotent() -> TestResult {
        let [a] = products();
        let mut cart = Cart::new(PHP);
        let key = cart.add(a, php(100))?;

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.get(key).is_none());

        cart.clear();
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn subtotal_and_item_count() -> TestResult {
        let [a, b] = products();
        let mut cart = Cart::new(PHP);
        cart.add_item(a, php(7800), 2, Size::Regular)?;
        cart.add_item(b, php(8200), 1, Size::Regular)?;

        assert_eq!(cart.subtotal()?, php(23_800));
        assert_eq!(cart.item_count(), 3);
        assert_eq!(Cart::new(PHP).subtotal()?, php(0));

        Ok(())
    }
}
