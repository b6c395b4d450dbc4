//! Receipt
//!
//! The order summary shown at checkout, rendered as a text table.

use std::io;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::Catalog,
    checkout::OrderTotals,
    pricing::PricingError,
    products::{ProductKey, Size},
};

/// Errors that can occur when building or writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// A line total could not be calculated.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// A cart line refers to a product missing from the catalog.
    #[error("missing product {0:?}")]
    MissingProduct(ProductKey),

    /// Writing the receipt failed.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// One row of the receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine<'a> {
    /// Product name
    pub name: String,

    /// Size ordered
    pub size: Size,

    /// Units ordered
    pub quantity: u32,

    /// Price per unit
    pub unit_price: Money<'a, Currency>,

    /// Price for all units
    pub total: Money<'a, Currency>,
}

/// Snapshot of a cart and its totals, kept so it can be printed after the cart is cleared.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 8]>,
    totals: OrderTotals<'a>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for `cart`, naming products from `catalog`.
    ///
    /// # Errors
    ///
    /// - [`ReceiptError::MissingProduct`]: a line's product is not in `catalog`.
    /// - [`ReceiptError::Pricing`]: a line total overflowed.
    pub fn new(
        cart: &Cart<'a>,
        catalog: &Catalog<'_>,
        totals: OrderTotals<'a>,
    ) -> Result<Self, ReceiptError> {
        let lines = cart
            .iter()
            .map(|line| {
                let product = catalog
                    .get(line.product())
                    .ok_or(ReceiptError::MissingProduct(line.product()))?;

                Ok(ReceiptLine {
                    name: product.name.clone(),
                    size: line.size(),
                    quantity: line.quantity(),
                    unit_price: *line.unit_price(),
                    total: line.total()?,
                })
            })
            .collect::<Result<SmallVec<_>, ReceiptError>>()?;

        Ok(Self { lines, totals })
    }

    /// Receipt rows in cart order.
    pub fn lines(&self) -> &[ReceiptLine<'a>] {
        &self.lines
    }

    /// Order totals
    pub fn totals(&self) -> &OrderTotals<'a> {
        &self.totals
    }

    /// Write the receipt table and the summary.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::Io`] if writing fails.
    pub fn write_to(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Size", "Qty", "Unit Price", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.size.to_string(),
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.total.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Theme::from(Style::modern_rounded()));
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}")?;

        for (label, value) in self.summary_rows() {
            writeln!(out, "{label:>10}  {value:>12}")?;
        }

        Ok(())
    }

    fn summary_rows(&self) -> SmallVec<[(&'static str, String); 4]> {
        let mut rows = SmallVec::new();

        rows.push(("Subtotal", self.totals.subtotal.to_string()));

        rows.push((
            "Shipping",
            if self.totals.free_shipping() {
                "FREE".to_string()
            } else {
                self.totals.shipping.to_string()
            },
        ));

        if self.totals.has_discount() {
            rows.push(("Discount", format!("-{}", self.totals.discount)));
        }

        rows.push(("Total", self.totals.total.to_string()));

        rows
    }
}
