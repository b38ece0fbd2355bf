//! Checkout errors.

use std::time::Duration;

use aura::pricing::PricingError;
use thiserror::Error;

use crate::{checkout::form::ValidationError, orders::OrdersApiError};

/// Reasons sending an order failed.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The order service refused or could not be reached.
    #[error(transparent)]
    Api(#[from] OrdersApiError),

    /// The order service did not answer in time.
    #[error("order service did not respond within {0:?}")]
    Timeout(Duration),
}

/// Errors returned by a checkout attempt.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another attempt is already in flight.
    #[error("checkout already in progress")]
    InProgress,

    /// The shopper is not signed in.
    #[error("Please sign in to checkout")]
    AuthRequired,

    /// The form or cart failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No user id could be found for a signed-in shopper.
    #[error("could not determine the signed-in user")]
    IdentityResolution,

    /// Sending the order failed.
    #[error("order submission failed: {0}")]
    Submission(#[from] SubmissionError),

    /// The cart could not be priced.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl CheckoutError {
    /// Message to show the shopper.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Submission(SubmissionError::Api(error)) => error.user_message(),
            CheckoutError::Submission(SubmissionError::Timeout(_))
            | CheckoutError::IdentityResolution
            | CheckoutError::Pricing(_) => "Checkout failed. Please try again.".to_string(),
            CheckoutError::InProgress
            | CheckoutError::AuthRequired
            | CheckoutError::Validation(_) => self.to_string(),
        }
    }

    /// Whether the attempt was refused before anything was sent.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CheckoutError::AuthRequired | CheckoutError::Validation(_)
        )
    }
}
