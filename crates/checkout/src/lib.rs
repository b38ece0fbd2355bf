//! Aura Checkout
//!
//! Async service layer over the [`aura`] cart: identity and geolocation seams, the HTTP order
//! client, order history, and the checkout orchestrator.

pub mod checkout;
pub mod config;
pub mod geolocation;
pub mod history;
pub mod identity;
pub mod money;
pub mod observability;
pub mod orders;

pub use checkout::{
    CheckoutError, CheckoutForm, CheckoutOrchestrator, CheckoutState, CheckoutTimeouts,
    OrderConfirmation, SharedCart,
};
pub use config::CheckoutConfig;
pub use history::{Order, OrderHistory, OrderStatus};
