//! Configuration
//!
//! Settings groups shared by the binary's commands. Each group reads from flags with an
//! environment fallback; `.env` is loaded before parsing.

use clap::Args;
use rust_decimal::Decimal;
use tessera::{
    money::{CurrencyError, parse_currency},
    pricing::{InvalidConfig, PricingConfig},
};
use thiserror::Error;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

#[derive(Debug, Error)]
pub enum PricingSettingsError {
    #[error(transparent)]
    Currency(#[from] CurrencyError),

    #[error(transparent)]
    Invalid(#[from] InvalidConfig),
}

/// Store-wide pricing settings.
#[derive(Debug, Args)]
pub struct PricingSettings {
    /// Tax rate as a fraction, e.g. 0.23 for 23% VAT
    #[arg(long, env = "TAX_RATE", default_value = "0.23")]
    pub tax_rate: Decimal,

    /// Orders above this post-discount amount ship free
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD", default_value = "100")]
    pub free_shipping_threshold: Decimal,

    /// Shipping fee charged below the free shipping threshold
    #[arg(long, env = "FLAT_SHIPPING_FEE", default_value = "10")]
    pub flat_shipping_fee: Decimal,

    /// ISO 4217 currency code prices are quoted in
    #[arg(long, env = "STORE_CURRENCY", default_value = "PLN")]
    pub currency: String,
}

impl PricingSettings {
    /// Validate into the pricing engine's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency is unknown or any amount is negative.
    pub fn to_pricing_config(&self) -> Result<PricingConfig, PricingSettingsError> {
        let currency = parse_currency(&self.currency)?;

        Ok(PricingConfig::new(
            self.tax_rate,
            self.free_shipping_threshold,
            self.flat_shipping_fee,
            currency,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rust_decimal_macros::dec;
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Parser)]
    struct Harness {
        #[command(flatten)]
        pricing: PricingSettings,

        #[command(flatten)]
        logging: LoggingConfig,
    }

    #[test]
    fn pricing_defaults_match_store_settings() -> TestResult {
        let harness = Harness::try_parse_from(["tessera"])?;
        let config = harness.pricing.to_pricing_config()?;

        assert_eq!(config.tax_rate(), dec!(0.23));
        assert_eq!(config.free_shipping_threshold(), dec!(100));
        assert_eq!(config.flat_shipping_fee(), dec!(10));
        assert_eq!(config.currency(), iso::PLN);

        Ok(())
    }

    #[test]
    fn pricing_flags_override_defaults() -> TestResult {
        let harness = Harness::try_parse_from([
            "tessera",
            "--tax-rate",
            "0.08",
            "--currency",
            "EUR",
            "--log-format",
            "json",
        ])?;
        let config = harness.pricing.to_pricing_config()?;

        assert_eq!(config.tax_rate(), dec!(0.08));
        assert_eq!(config.currency(), iso::EUR);
        assert_eq!(harness.logging.log_format, LogFormat::Json);

        Ok(())
    }

    #[test]
    fn negative_fee_is_rejected() -> TestResult {
        let harness = Harness::try_parse_from(["tessera", "--flat-shipping-fee=-1"])?;

        assert!(matches!(
            harness.pricing.to_pricing_config(),
            Err(PricingSettingsError::Invalid(InvalidConfig::NegativeShippingFee))
        ));

        Ok(())
    }

    #[test]
    fn unknown_currency_is_rejected() -> TestResult {
        let harness = Harness::try_parse_from(["tessera", "--currency", "XYZ"])?;

        assert!(matches!(
            harness.pricing.to_pricing_config(),
            Err(PricingSettingsError::Currency(_))
        ));

        Ok(())
    }
}
