//! Conversions between minor-unit money and the decimal amounts the order service speaks.

use aura::promotions::major_to_minor;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Express an amount in major units, e.g. `1299` cents as `12.99`.
pub fn to_major(money: &Money<'static, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Read a major-unit amount as money, rounding half away from zero to whole minor units.
///
/// Returns `None` if the amount does not fit in minor units.
pub fn from_major(amount: Decimal, currency: &'static Currency) -> Option<Money<'static, Currency>> {
    major_to_minor(amount, currency).map(|minor| Money::from_minor(minor, currency))
}
