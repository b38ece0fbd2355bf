//! Aura
//!
//! Cart, promo code and pricing core for the Aura cosmetics storefront.

pub mod cart;
pub mod discounts;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod promotions;
pub mod summary;
