//! Storefront configuration
//!
//! Pricing rules can be supplied as YAML; anything not configured falls back to the shop's
//! defaults.
//!
//! ```yaml
//! shipping:
//!   flat_fee: 8.00 PHP
//!   free_delivery_threshold: 500.00 PHP
//!   enforce_free_delivery: false
//! promotion:
//!   code: SWEET20
//!   percentage: 0.2
//! preparation_minutes:
//!   min: 15
//!   max: 20
//! ```

use std::{fs, path::Path};

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    checkout::policy::{
        DEFAULT_PROMO_CODE, PreparationWindow, PricingPolicy, PromoCode, ShippingPolicy,
    },
    pricing::{PricingError, parse_price},
};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the configuration file
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A configured amount is not a valid price
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Configured amounts use different currencies
    #[error("currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Promo percentage outside 0.0..=1.0
    #[error("invalid promotion percentage: {0}")]
    InvalidPercentage(f64),

    /// Promo code is blank
    #[error("promotion code cannot be blank")]
    BlankPromoCode,

    /// Preparation window ends before it starts
    #[error("invalid preparation window: {0}-{1} minutes")]
    InvalidPreparationWindow(u32, u32),
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Delivery fee rules
    pub shipping: ShippingConfig,

    /// The promo code, or `None` to disable promo codes
    pub promotion: Option<PromotionConfig>,

    /// Quoted preparation time
    pub preparation_minutes: PreparationConfig,
}

/// Delivery fee configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// Fee on any non-empty order, e.g. "8.00 PHP"
    pub flat_fee: String,

    /// Advertised free-delivery threshold, e.g. "500.00 PHP"
    pub free_delivery_threshold: Option<String>,

    /// Whether the threshold waives the fee
    pub enforce_free_delivery: bool,
}

/// Promo code configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PromotionConfig {
    /// The literal code
    pub code: String,

    /// Share of the subtotal taken off (0.0 - 1.0)
    pub percentage: f64,
}

/// Preparation window configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PreparationConfig {
    /// Earliest, in minutes
    pub min: u32,

    /// Latest, in minutes
    pub max: u32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            shipping: ShippingConfig::default(),
            promotion: Some(PromotionConfig {
                code: DEFAULT_PROMO_CODE.to_string(),
                percentage: 0.2,
            }),
            preparation_minutes: PreparationConfig::default(),
        }
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            flat_fee: "8.00 PHP".to_string(),
            free_delivery_threshold: Some("500.00 PHP".to_string()),
            enforce_free_delivery: false,
        }
    }
}

impl Default for PreparationConfig {
    fn default() -> Self {
        Self { min: 15, max: 20 }
    }
}

impl StorefrontConfig {
    /// Parse configuration from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Validate the configuration and build the pricing policy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid setting.
    pub fn try_into_policy(self) -> Result<PricingPolicy<'static>, ConfigError> {
        let (fee_minor, currency) = parse_price(&self.shipping.flat_fee)?;

        let free_delivery_threshold = self
            .shipping
            .free_delivery_threshold
            .as_deref()
            .map(|threshold| money_in(threshold, currency))
            .transpose()?;

        let promotion = self.promotion.map(PromoCode::try_from).transpose()?;

        let PreparationConfig { min, max } = self.preparation_minutes;

        if min > max {
            return Err(ConfigError::InvalidPreparationWindow(min, max));
        }

        Ok(PricingPolicy {
            shipping: ShippingPolicy {
                flat_fee: Money::from_minor(fee_minor, currency),
                free_delivery_threshold,
                enforce_free_delivery: self.shipping.enforce_free_delivery,
            },
            promotion,
            preparation: PreparationWindow {
                min_minutes: min,
                max_minutes: max,
            },
        })
    }
}

impl TryFrom<PromotionConfig> for PromoCode {
    type Error = ConfigError;

    fn try_from(config: PromotionConfig) -> Result<Self, Self::Error> {
        if config.code.trim().is_empty() {
            return Err(ConfigError::BlankPromoCode);
        }

        if !(0.0..=1.0).contains(&config.percentage) {
            return Err(ConfigError::InvalidPercentage(config.percentage));
        }

        Ok(PromoCode::new(config.code, Percentage::from(config.percentage)))
    }
}

fn money_in(
    price: &str,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, ConfigError> {
    let (minor, parsed_currency) = parse_price(price)?;

    if parsed_currency != currency {
        return Err(ConfigError::CurrencyMismatch(
            currency.iso_alpha_code.to_string(),
            parsed_currency.iso_alpha_code.to_string(),
        ));
    }

    Ok(Money::from_minor(minor, currency))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rusty_money::iso::USD;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn default_config_matches_default_policy() -> TestResult {
        let policy = StorefrontConfig::default().try_into_policy()?;

        assert_eq!(policy, PricingPolicy::default());

        Ok(())
    }

    #[test]
    fn partial_yaml_keeps_defaults() -> TestResult {
        let config = StorefrontConfig::from_yaml("shipping:\n  enforce_free_delivery: true\n")?;

        assert!(config.shipping.enforce_free_delivery);
        assert_eq!(config.shipping.flat_fee, "8.00 PHP");
        assert_eq!(config.preparation_minutes, PreparationConfig::default());
        assert!(config.promotion.is_some());

        Ok(())
    }

    #[test]
    fn full_yaml_builds_policy() -> TestResult {
        let yaml = r"
shipping:
  flat_fee: 5.00 USD
  free_delivery_threshold: 50.00 USD
  enforce_free_delivery: true
promotion:
  code: HALFOFF
  percentage: 0.5
preparation_minutes:
  min: 5
  max: 10
";

        let policy = StorefrontConfig::from_yaml(yaml)?.try_into_policy()?;

        assert_eq!(policy.shipping.flat_fee, Money::from_minor(500, USD));
        assert_eq!(
            policy.shipping.free_delivery_threshold,
            Some(Money::from_minor(5000, USD))
        );
        assert!(policy.shipping.enforce_free_delivery);
        assert_eq!(
            policy.promotion.as_ref().map(PromoCode::code),
            Some("HALFOFF")
        );
        assert_eq!(policy.preparation.to_string(), "5-10 minutes");

        Ok(())
    }

    #[test]
    fn null_promotion_disables_codes() -> TestResult {
        let policy = StorefrontConfig::from_yaml("promotion: null\n")?.try_into_policy()?;

        assert!(policy.promotion.is_none());

        Ok(())
    }

    #[test]
    fn mismatched_threshold_currency_errors() {
        let config = StorefrontConfig {
            shipping: ShippingConfig {
                free_delivery_threshold: Some("500.00 USD".to_string()),
                ..ShippingConfig::default()
            },
            ..StorefrontConfig::default()
        };

        assert!(matches!(
            config.try_into_policy(),
            Err(ConfigError::CurrencyMismatch(expected, found)) if expected == "PHP" && found == "USD"
        ));
    }

    #[test]
    fn invalid_promotion_errors() {
        let percentage = StorefrontConfig {
            promotion: Some(PromotionConfig {
                code: "BIG".to_string(),
                percentage: 1.5,
            }),
            ..StorefrontConfig::default()
        };

        let blank = StorefrontConfig {
            promotion: Some(PromotionConfig {
                code: " ".to_string(),
                percentage: 0.1,
            }),
            ..StorefrontConfig::default()
        };

        assert!(matches!(
            percentage.try_into_policy(),
            Err(ConfigError::InvalidPercentage(_))
        ));
        assert!(matches!(
            blank.try_into_policy(),
            Err(ConfigError::BlankPromoCode)
        ));
    }

    #[test]
    fn inverted_preparation_window_errors() {
        let config = StorefrontConfig {
            preparation_minutes: PreparationConfig { min: 30, max: 10 },
            ..StorefrontConfig::default()
        };

        assert!(matches!(
            config.try_into_policy(),
            Err(ConfigError::InvalidPreparationWindow(30, 10))
        ));
    }

    #[test]
    fn load_reads_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"preparation_minutes: { min: 10, max: 12 }\n")?;

        let config = StorefrontConfig::load(file.path())?;

        assert_eq!(config.preparation_minutes, PreparationConfig { min: 10, max: 12 });

        Ok(())
    }
}
