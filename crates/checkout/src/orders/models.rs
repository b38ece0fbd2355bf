//! Order API wire models.

use std::collections::BTreeMap;

use aura::products::ProductId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// One product and quantity in an order request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    /// Product ordered
    pub product_id: ProductId,

    /// Units ordered
    pub quantity: u32,
}

/// Body of an order placement request.
///
/// Lines carry only product and quantity; the price is a single aggregate for the whole order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    /// Customer placing the order
    pub user_id: UserId,

    /// Products and quantities
    pub products: Vec<OrderLineRequest>,

    /// Single-line shipping address
    pub address: String,

    /// Postal code
    pub pincode: u32,

    /// Order price in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Contact phone number
    pub phone: String,

    /// Payment method code, e.g. `card` or `cod`
    pub payment_method: String,
}

/// A past order as returned by the order history endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Product name to quantity.
    ///
    /// Held sorted by product name; the order the service listed the products in is not kept.
    pub products: BTreeMap<String, u32>,

    /// Order price in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,

    /// Shipping address
    #[serde(default)]
    pub address: String,

    /// Contact phone number
    #[serde(default)]
    pub phone: String,

    /// Status code, 0 to 4
    pub status: i64,

    /// When the order was placed
    #[serde(default)]
    pub order_time: String,
}
