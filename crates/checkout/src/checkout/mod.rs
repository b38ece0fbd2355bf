//! Checkout
//!
//! Turns the shared cart and the shopper's form into a placed order. Only one attempt runs at a
//! time; its progress is published as a [`CheckoutState`] on a watch channel.

pub mod errors;
pub mod form;
pub mod service;
pub mod state;

pub use errors::{CheckoutError, SubmissionError};
pub use form::{
    CardDetails, CheckoutForm, PaymentMethod, RequiredField, ShippingDetails, ValidationError,
};
pub use service::{CheckoutOrchestrator, CheckoutTimeouts, OrderConfirmation, SharedCart};
pub use state::CheckoutState;
