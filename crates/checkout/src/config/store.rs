//! Store Config

use std::path::PathBuf;

use clap::Args;
use rust_decimal::Decimal;

/// Currency, pricing and promo settings.
#[derive(Debug, Clone, Args)]
pub struct StoreConfig {
    /// ISO 4217 store currency
    #[arg(long, env = "STORE_CURRENCY", default_value = "USD")]
    pub store_currency: String,

    /// Subtotal above which shipping is free, in minor units
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD_MINOR", default_value_t = 7_500_i64)]
    pub free_shipping_threshold_minor: i64,

    /// Shipping fee at or below the threshold, in minor units
    #[arg(long, env = "FLAT_SHIPPING_FEE_MINOR", default_value_t = 899_i64)]
    pub flat_shipping_fee_minor: i64,

    /// Tax rate as a fraction, e.g. 0.08
    #[arg(long, env = "TAX_RATE", default_value = "0.08")]
    pub tax_rate: Decimal,

    /// YAML promo table; the built-in codes are used when unset
    #[arg(long, env = "PROMO_TABLE_PATH")]
    pub promo_table_path: Option<PathBuf>,
}
