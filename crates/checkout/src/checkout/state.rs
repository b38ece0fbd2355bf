//! Checkout state.

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing in flight.
    #[default]
    Idle,

    /// Checking sign-in, form and cart.
    Validating,

    /// Refused before anything was sent.
    Rejected(String),

    /// The order is being sent.
    Submitting,

    /// The order service accepted the order.
    Succeeded {
        /// Acknowledgement text from the order service
        acknowledgement: String,
    },

    /// Sending the order failed. The cart is untouched and checkout can be retried.
    Failed(String),
}

impl CheckoutState {
    /// Whether an attempt is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, CheckoutState::Validating | CheckoutState::Submitting)
    }
}
