//! Utils

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use thiserror::Error;

use crate::products::{Size, UnknownSize};

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct ExampleCheckoutArgs {
    /// Catalog YAML file
    #[clap(short, long, default_value = "fixtures/catalog/bakery.yml")]
    pub catalog: PathBuf,

    /// Storefront config YAML file; the shop defaults are used when omitted
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Order line as `id[:quantity[:size]]`, e.g. `11:2:Large`. Repeatable.
    #[clap(short = 'a', long = "add", value_name = "LINE")]
    pub lines: Vec<OrderLineArg>,

    /// Promo code to enter at checkout
    #[clap(short, long)]
    pub promo: Option<String>,

    /// Email to sign in with
    #[clap(long, default_value = "guest@glaze.test")]
    pub email: String,

    /// Password to sign in with
    #[clap(long, default_value = "donuts")]
    pub password: String,
}

/// Errors parsing an order line argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderLineError {
    /// No product id before the first `:`
    #[error("order line is missing a product id")]
    MissingProduct,

    /// Quantity is not a positive integer
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Unrecognised size
    #[error(transparent)]
    Size(#[from] UnknownSize),
}

/// One `--add` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineArg {
    /// Catalog id
    pub product: String,

    /// Units to add
    pub quantity: u32,

    /// Size to add
    pub size: Size,
}

impl FromStr for OrderLineArg {
    type Err = OrderLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');

        let product = parts
            .next()
            .filter(|id| !id.is_empty())
            .ok_or(OrderLineError::MissingProduct)?
            .to_string();

        let quantity = match parts.next() {
            Some(quantity) => quantity
                .parse::<u32>()
                .ok()
                .filter(|quantity| *quantity > 0)
                .ok_or_else(|| OrderLineError::InvalidQuantity(quantity.to_string()))?,
            None => 1,
        };

        let size = parts.next().map(str::parse).transpose()?.unwrap_or_default();

        Ok(Self {
            product,
            quantity,
            size,
        })
    }
}
