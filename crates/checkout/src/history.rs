//! Order History
//!
//! Read model over the order service's history endpoint. Orders are owned by the service; this
//! module only fetches and reshapes them for display.

use std::{fmt, sync::Arc};

use jiff::{Timestamp, civil, tz::TimeZone};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::warn;

use crate::{
    identity::UserId,
    money::from_major,
    orders::{OrderRecord, OrdersApi, OrdersApiError},
};

/// Errors that can occur while loading order history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The order service request failed.
    #[error(transparent)]
    Api(#[from] OrdersApiError),

    /// An order's price could not be represented in minor units.
    #[error("order {0} has an out of range price")]
    InvalidPrice(u32),
}

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    /// Received, not yet worked on
    Pending,

    /// Being prepared
    Processing,

    /// Handed to the carrier
    Shipped,

    /// Received by the customer
    Delivered,

    /// Will not be fulfilled
    Cancelled,
}

impl OrderStatus {
    /// Map the service's status code. Unknown codes read as [`OrderStatus::Pending`].
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => OrderStatus::Processing,
            2 => OrderStatus::Shipped,
            3 => OrderStatus::Delivered,
            4 => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }

    /// Lower case label, e.g. `"shipped"`.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product in a past order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    /// Product name
    pub name: String,

    /// Units ordered
    pub quantity: u32,

    /// Price shown for the item.
    ///
    /// The service only reports an order-level total, so this is that total split evenly
    /// across the order's items.
    pub display_price: Money<'static, Currency>,
}

/// A past order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// 1-based position in the customer's history
    pub id: u32,

    /// When the order was placed, if the service's timestamp could be read
    pub placed_at: Option<civil::DateTime>,

    /// Fulfilment status
    pub status: OrderStatus,

    /// Products ordered, sorted by name
    pub items: Vec<OrderItem>,

    /// Order subtotal
    pub subtotal: Money<'static, Currency>,

    /// Shipping charged
    pub shipping: Money<'static, Currency>,

    /// Tax charged
    pub tax: Money<'static, Currency>,

    /// Amount charged
    pub total: Money<'static, Currency>,

    /// Shipping address
    pub shipping_address: String,

    /// Contact phone number
    pub phone: String,
}

/// Loads a customer's past orders.
#[derive(Clone)]
pub struct OrderHistory {
    api: Arc<dyn OrdersApi>,
    currency: &'static Currency,
}

impl fmt::Debug for OrderHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderHistory")
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}

impl OrderHistory {
    /// Create a history reader over `api`, reading prices in `currency`.
    pub fn new(api: Arc<dyn OrdersApi>, currency: &'static Currency) -> Self {
        Self { api, currency }
    }

    /// Fetch and convert every order placed by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`HistoryError`] if the request fails or a price is out of range.
    pub async fn fetch(&self, user_id: &UserId) -> Result<Vec<Order>, HistoryError> {
        let records = self.api.fetch_orders(user_id).await?;

        records
            .into_iter()
            .zip(1_u32..)
            .map(|(record, id)| order_from_record(id, record, self.currency))
            .collect()
    }
}

/// Convert a wire record into an [`Order`].
///
/// # Errors
///
/// Returns [`HistoryError::InvalidPrice`] if the total does not fit in minor units.
pub fn order_from_record(
    id: u32,
    record: OrderRecord,
    currency: &'static Currency,
) -> Result<Order, HistoryError> {
    let total = from_major(record.total_price, currency).ok_or(HistoryError::InvalidPrice(id))?;
    let zero = Money::from_minor(0, currency);

    let item_count = i64::try_from(record.products.len()).unwrap_or(i64::MAX).max(1);
    let display_price = Money::from_minor(total.to_minor_units() / item_count, currency);

    let items = record
        .products
        .into_iter()
        .map(|(name, quantity)| OrderItem {
            name,
            quantity,
            display_price,
        })
        .collect();

    Ok(Order {
        id,
        placed_at: parse_order_time(&record.order_time),
        status: OrderStatus::from_code(record.status),
        items,
        subtotal: total,
        shipping: zero,
        tax: zero,
        total,
        shipping_address: record.address,
        phone: record.phone,
    })
}

/// Orders with the given status, or every order when `status` is `None`.
pub fn filter_by_status(orders: &[Order], status: Option<OrderStatus>) -> Vec<&Order> {
    orders
        .iter()
        .filter(|order| status.is_none_or(|status| order.status == status))
        .collect()
}

fn parse_order_time(raw: &str) -> Option<civil::DateTime> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(datetime) = raw.parse::<civil::DateTime>() {
        return Some(datetime);
    }

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Some(timestamp.to_zoned(TimeZone::UTC).datetime());
    }

    warn!(order_time = raw, "unreadable order time");

    None
}
