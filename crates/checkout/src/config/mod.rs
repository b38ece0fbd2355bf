//! Checkout configuration module

use std::{fs, io, path::PathBuf};

use aura::{
    pricing::PricingRules,
    promotions::{PromoTable, PromoTableError},
};
use clap::Parser;
use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::{
    checkout::CheckoutTimeouts,
    config::{observability::LoggingConfig, orders::OrdersConfig, store::StoreConfig},
    orders::{HttpOrdersApi, OrdersApiConfig},
};

pub mod observability;
pub mod orders;
pub mod store;

pub use observability::LogFormat;

/// Errors raised while turning configuration into domain objects.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The currency code is not a known ISO 4217 code.
    #[error("unknown currency: {0}")]
    UnknownCurrency(String),

    /// The tax rate is outside `0..=1`.
    #[error("tax rate must be between 0 and 1, got {0}")]
    InvalidTaxRate(Decimal),

    /// A shipping amount is negative.
    #[error("shipping amounts must not be negative")]
    NegativeShippingAmount,

    /// The promo table file could not be read.
    #[error("could not read promo table {path}: {source}")]
    PromoFile {
        /// File that was read
        path: PathBuf,

        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The promo table file is invalid.
    #[error(transparent)]
    PromoTable(#[from] PromoTableError),
}

/// Aura checkout configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "aura-checkout", about = "Aura storefront checkout", long_about = None)]
pub struct CheckoutConfig {
    /// Order service settings.
    #[command(flatten)]
    pub orders: OrdersConfig,

    /// Currency, pricing and promo settings.
    #[command(flatten)]
    pub store: StoreConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl CheckoutConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// The store currency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] if the code is not recognised.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        let code = self.store.store_currency.trim().to_uppercase();

        iso::find(&code).ok_or(ConfigError::UnknownCurrency(code))
    }

    /// Shipping and tax rules in the store currency.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the currency is unknown or an amount is out of range.
    pub fn pricing_rules(&self) -> Result<PricingRules, ConfigError> {
        let currency = self.currency()?;
        let store = &self.store;

        if store.tax_rate < Decimal::ZERO || store.tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidTaxRate(store.tax_rate));
        }

        if store.free_shipping_threshold_minor < 0 || store.flat_shipping_fee_minor < 0 {
            return Err(ConfigError::NegativeShippingAmount);
        }

        Ok(PricingRules {
            free_shipping_threshold: Money::from_minor(
                store.free_shipping_threshold_minor,
                currency,
            ),
            flat_shipping_fee: Money::from_minor(store.flat_shipping_fee_minor, currency),
            tax_rate: Percentage::from(store.tax_rate),
        })
    }

    /// Promo codes from the configured YAML file, or the built-in storefront codes.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn promo_table(&self) -> Result<PromoTable, ConfigError> {
        let currency = self.currency()?;

        let Some(path) = &self.store.promo_table_path else {
            return Ok(PromoTable::storefront(currency));
        };

        let yaml = fs::read_to_string(path).map_err(|source| ConfigError::PromoFile {
            path: path.clone(),
            source,
        })?;

        Ok(PromoTable::from_yaml(&yaml, currency)?)
    }

    /// Timeouts for checkout's slow steps.
    #[must_use]
    pub fn timeouts(&self) -> CheckoutTimeouts {
        CheckoutTimeouts {
            submit: self.orders.submit_timeout(),
            geolocation: self.orders.geolocation_timeout(),
        }
    }

    /// Settings for the HTTP order client.
    #[must_use]
    pub fn orders_api_config(&self) -> OrdersApiConfig {
        OrdersApiConfig {
            base_url: self.orders.orders_api_url.clone(),
            token: self
                .orders
                .orders_api_token
                .clone()
                .filter(|token| !token.is_empty()),
            timeout: self.orders.submit_timeout(),
        }
    }

    /// HTTP order client built from this configuration.
    #[must_use]
    pub fn http_client(&self) -> HttpOrdersApi {
        HttpOrdersApi::new(self.orders_api_config())
    }
}
