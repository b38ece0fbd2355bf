//! Order Service Config

use std::time::Duration;

use clap::Args;

/// Order service connection settings.
#[derive(Debug, Clone, Args)]
pub struct OrdersConfig {
    /// Order service base URL
    #[arg(long, env = "ORDERS_API_URL", default_value = "http://localhost:8080")]
    pub orders_api_url: String,

    /// Bearer token for the order service
    #[arg(long, env = "ORDERS_API_TOKEN", hide_env_values = true)]
    pub orders_api_token: Option<String>,

    /// How long to wait for the order service, in milliseconds
    #[arg(long, env = "ORDER_SUBMIT_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub order_submit_timeout_ms: u64,

    /// How long to wait for a device position, in milliseconds
    #[arg(long, env = "GEOLOCATION_TIMEOUT_MS", default_value_t = 5_000_u64)]
    pub geolocation_timeout_ms: u64,
}

impl OrdersConfig {
    /// Order service timeout.
    #[must_use]
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_millis(self.order_submit_timeout_ms)
    }

    /// Geolocation timeout.
    #[must_use]
    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }
}
