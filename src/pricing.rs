//! Pricing
//!
//! Derives the order summary shown next to the cart: subtotal, shipping, tax, promo discount and
//! grand total. Nothing here holds state; every summary is computed fresh from the current lines.

use decimal_percentage::Percentage;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    cart::CartLine,
    discounts::{DiscountError, calculate_discount, percent_of_minor},
    products::ProductId,
    promotions::AppliedPromo,
};

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line's unit price times its quantity does not fit in minor units.
    #[error("line total for product {0} overflowed")]
    LineOverflow(ProductId),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Errors bubbled up from discount calculation.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Shipping and tax policy applied on top of the cart subtotal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingRules {
    /// Shipping is free once the subtotal is strictly above this amount.
    pub free_shipping_threshold: Money<'static, Currency>,

    /// Shipping charged at or below the threshold.
    pub flat_shipping_fee: Money<'static, Currency>,

    /// Tax charged on the subtotal.
    pub tax_rate: Percentage,
}

impl PricingRules {
    /// The storefront's policy: free shipping over 75.00, otherwise 8.99, and 8% tax.
    pub fn storefront(currency: &'static Currency) -> Self {
        Self {
            free_shipping_threshold: Money::from_minor(75_00, currency),
            flat_shipping_fee: Money::from_minor(8_99, currency),
            tax_rate: Percentage::from(0.08),
        }
    }

    /// Currency the rules are expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.free_shipping_threshold.currency()
    }

    /// Shipping charged for a given subtotal.
    pub fn shipping_for(&self, subtotal: &Money<'static, Currency>) -> Money<'static, Currency> {
        if subtotal.to_minor_units() > self.free_shipping_threshold.to_minor_units() {
            Money::from_minor(0, subtotal.currency())
        } else {
            self.flat_shipping_fee
        }
    }

    /// How much more must be spent before shipping becomes free.
    ///
    /// Returns `None` once shipping is already free.
    pub fn amount_to_free_shipping(
        &self,
        subtotal: &Money<'static, Currency>,
    ) -> Option<Money<'static, Currency>> {
        let threshold = self.free_shipping_threshold.to_minor_units();
        let spent = subtotal.to_minor_units();

        (spent <= threshold).then(|| Money::from_minor(threshold - spent, subtotal.currency()))
    }
}

/// Derived pricing for the current cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricingSummary {
    /// Sum of unit price times quantity over every line
    pub subtotal: Money<'static, Currency>,

    /// Shipping charge
    pub shipping: Money<'static, Currency>,

    /// Tax on the subtotal
    pub tax: Money<'static, Currency>,

    /// Promo discount, between zero and the subtotal
    pub discount: Money<'static, Currency>,

    /// `subtotal + shipping + tax - discount`
    pub total: Money<'static, Currency>,
}

impl PricingSummary {
    /// Whether shipping is free for this summary.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }
}

/// Calculates the subtotal of a set of cart lines.
///
/// An empty set of lines totals zero in `currency`.
///
/// # Errors
///
/// - [`PricingError::LineOverflow`]: a line total does not fit in minor units.
/// - [`PricingError::Money`]: a line is priced in another currency.
pub fn total_price(
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, PricingError> {
    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |acc, line| {
            Ok(acc.add(line.line_total()?)?)
        })
}

/// Calculates the full pricing summary for a set of cart lines.
///
/// Tax is charged on the subtotal alone. Neither shipping nor the discount changes the tax base.
///
/// # Errors
///
/// Returns a [`PricingError`] if a line total overflows, currencies differ between the lines, the
/// rules and the promo, or the tax or discount percentage cannot be applied.
pub fn summarise(
    lines: &[CartLine],
    promo: Option<&AppliedPromo>,
    rules: &PricingRules,
) -> Result<PricingSummary, PricingError> {
    let currency = rules.currency();
    let subtotal = total_price(lines, currency)?;

    let shipping = rules.shipping_for(&subtotal);

    let tax = Money::from_minor(
        percent_of_minor(&rules.tax_rate, subtotal.to_minor_units())?,
        currency,
    );

    let discount = match promo {
        Some(promo) => calculate_discount(&promo.discount, subtotal)?,
        None => Money::from_minor(0, currency),
    };

    let total = subtotal.add(shipping)?.add(tax)?.sub(discount)?;

    Ok(PricingSummary {
        subtotal,
        shipping,
        tax,
        discount,
        total,
    })
}
