//! Aura prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartEvent, CartLine, CartObserver, MAX_LINE_QUANTITY, SubscriptionKey},
    discounts::{Discount, DiscountError},
    pricing::{PricingError, PricingRules, PricingSummary},
    products::{Product, ProductId},
    promotions::{AppliedPromo, PromoResult, PromoTable, PromoTableError},
    summary::{OrderSummary, SummaryError},
};
