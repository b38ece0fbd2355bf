//! Order Summary
//!
//! Text rendering of a priced cart: a table of lines followed by the pricing breakdown.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::Cart,
    pricing::{PricingError, PricingRules, PricingSummary},
};

/// Errors that can occur when writing an order summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// Error pricing the cart.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// Order summary for a cart under a set of pricing rules.
#[derive(Debug, Clone, Copy)]
pub struct OrderSummary<'a> {
    cart: &'a Cart,
    rules: &'a PricingRules,
}

impl<'a> OrderSummary<'a> {
    /// Create a summary view over a cart.
    pub fn new(cart: &'a Cart, rules: &'a PricingRules) -> Self {
        Self { cart, rules }
    }

    /// Writes the summary to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be priced or the output cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), SummaryError> {
        let pricing = self.cart.pricing(self.rules)?;

        let mut builder = Builder::default();

        builder.push_record(["Item", "Brand", "Qty", "Unit Price", "Line Total"]);

        for line in self.cart.lines() {
            builder.push_record([
                line.name().to_string(),
                line.brand().unwrap_or_default().to_string(),
                line.quantity().to_string(),
                line.unit_price().to_string(),
                line.line_total()?.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(out, "{table}").map_err(|_err| SummaryError::IO)?;

        self.write_breakdown(&mut out, &pricing)
    }

    fn write_breakdown(
        &self,
        out: &mut impl io::Write,
        pricing: &PricingSummary,
    ) -> Result<(), SummaryError> {
        let shipping = if pricing.has_free_shipping() {
            "Free".to_string()
        } else {
            pricing.shipping.to_string()
        };

        let mut rows: Vec<(String, String)> = vec![
            ("Subtotal".to_string(), pricing.subtotal.to_string()),
            ("Shipping".to_string(), shipping),
            ("Tax".to_string(), pricing.tax.to_string()),
        ];

        if let Some(promo) = self.cart.applied_promo() {
            rows.push((
                format!("Discount ({})", promo.code),
                format!("-{}", pricing.discount),
            ));
        }

        rows.push(("Total".to_string(), pricing.total.to_string()));

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")
                .map_err(|_err| SummaryError::IO)?;
        }

        if let Some(remaining) = self.rules.amount_to_free_shipping(&pricing.subtotal) {
            writeln!(out, "\n Add {remaining} more for free shipping!")
                .map_err(|_err| SummaryError::IO)?;
        }

        Ok(())
    }
}
