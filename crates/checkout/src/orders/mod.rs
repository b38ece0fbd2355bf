//! Orders
//!
//! Wire models and client for the external order service.

pub mod client;
pub mod models;

pub use client::{HttpOrdersApi, MockOrdersApi, OrdersApi, OrdersApiConfig, OrdersApiError};
pub use models::{OrderLineRequest, OrderRecord, OrderRequest};
