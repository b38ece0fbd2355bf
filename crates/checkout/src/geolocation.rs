//! Geolocation
//!
//! Best-effort device position attached to an order. A missing, denied or slow provider never
//! blocks checkout; the order goes out with `(0, 0)` instead.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Latitude and longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coordinates {
    /// Latitude
    pub latitude: f64,

    /// Longitude
    pub longitude: f64,
}

impl Coordinates {
    /// Create a coordinate pair.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Reasons a position could not be obtained.
#[derive(Debug, Error, PartialEq)]
pub enum GeolocationError {
    /// The device offers no geolocation.
    #[error("geolocation is not available")]
    Unavailable,

    /// The shopper declined to share their position.
    #[error("geolocation permission denied")]
    PermissionDenied,

    /// The provider failed for another reason.
    #[error("geolocation failed: {0}")]
    Failed(String),
}

/// Source of the device's position.
#[automock]
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// Ask for the device's current position.
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Provider for environments with no geolocation at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationProvider for NoGeolocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Ask `provider` for a position, waiting at most `wait`.
///
/// Falls back to `(0, 0)` on any error or when the wait runs out.
pub async fn locate_or_default(provider: &dyn GeolocationProvider, wait: Duration) -> Coordinates {
    match tokio::time::timeout(wait, provider.current_position()).await {
        Ok(Ok(position)) => position,
        Ok(Err(error)) => {
            warn!(%error, "using default coordinates");
            Coordinates::default()
        }
        Err(_elapsed) => {
            warn!(wait_ms = wait.as_millis(), "geolocation timed out, using default coordinates");
            Coordinates::default()
        }
    }
}
