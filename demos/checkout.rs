//! Checkout Example
//!
//! This example signs in, fills a cart from the bakery catalog, prices it and places the order.
//!
//! Use `-a id[:quantity[:size]]` to add order lines (repeatable)
//! Use `-p` to enter a promo code
//! Use `--config` to load storefront pricing rules from a YAML file
//! Set `RUST_LOG=debug` to trace cart changes

use std::io;

use anyhow::Result;

use clap::Parser;
use glaze::{
    catalog::Catalog,
    checkout::{PricingPolicy, PromoOutcome, compute_totals, confirm_order},
    config::StorefrontConfig,
    receipt::Receipt,
    session::Session,
    utils::{ExampleCheckoutArgs, OrderLineArg},
};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    let args = ExampleCheckoutArgs::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_err| EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = Catalog::load(&args.catalog)?;

    let policy = match &args.config {
        Some(path) => StorefrontConfig::load(path)?.try_into_policy()?,
        None => PricingPolicy::default(),
    };

    let lines = if args.lines.is_empty() {
        vec![
            "1:2".parse::<OrderLineArg>()?,
            "11:1:Large".parse::<OrderLineArg>()?,
        ]
    } else {
        args.lines
    };

    let mut session = Session::new(catalog.currency());
    let user = session.login(&args.email, &args.password)?;

    println!("Welcome back, {}!", user.display_name);

    for line in &lines {
        let product = catalog.key(&line.product)?;

        session
            .cart_mut()
            .add_from_catalog(&catalog, product, line.quantity, line.size)?;
    }

    println!("Cart: {} items", session.cart().item_count());

    if let Some(first) = session.cart().iter().next() {
        for (_, product) in catalog.related(first.product()) {
            let tags: Vec<&str> = product.tags.iter().collect();

            println!("You might also like: {} ({})", product.name, tags.join(", "));
        }
    }

    let promo = args.promo.unwrap_or_default();

    match policy.apply_promo_code(&promo) {
        PromoOutcome::Applied(percentage) => {
            let points = (percentage * Decimal::ONE_HUNDRED).normalize();

            println!("Promo code applied: {points}% off");
        }
        PromoOutcome::Invalid => println!("Invalid promo code: {promo}"),
        PromoOutcome::Blank => {}
    }

    if let Some(threshold) = policy.shipping.free_delivery_threshold {
        println!("Free delivery on orders over {threshold}");
    }

    let totals = compute_totals(session.cart(), &policy, &promo)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    Receipt::new(session.cart(), &catalog, totals)?.write_to(&mut handle)?;

    let confirmation = confirm_order(session.cart_mut(), &policy, &promo)?;

    println!(
        "\nOrder placed! {} items, {} paid. Your order will be ready in {}.",
        confirmation.item_count, confirmation.totals.total, confirmation.ready_in
    );

    session.logout();

    Ok(())
}
