//! Promo Codes
//!
//! Resolves a code typed in by the shopper into the discount it grants. Codes match exactly,
//! ignoring case and surrounding whitespace. Both table codes and entered codes are folded with
//! Unicode upper casing before comparison. Unknown codes are rejected, which is an ordinary
//! outcome rather than an error.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::discounts::Discount;

/// Errors raised while loading a promo table.
#[derive(Debug, Error)]
pub enum PromoTableError {
    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A rule had an empty code
    #[error("Promo code must not be empty")]
    EmptyCode,

    /// Two rules share the same code
    #[error("Duplicate promo code: {0}")]
    DuplicateCode(String),

    /// Fixed amount could not be represented in minor units
    #[error("Invalid amount for promo code {0}")]
    InvalidAmount(String),
}

/// A promo code that has been accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromo {
    /// Canonical (upper case) code
    pub code: String,

    /// Discount the code grants
    pub discount: Discount,
}

/// Outcome of evaluating a promo code.
#[derive(Debug, Clone, PartialEq)]
pub enum PromoResult {
    /// The code matched a rule.
    Applied(AppliedPromo),

    /// The code matched nothing.
    Rejected,
}

impl PromoResult {
    /// Whether the code was accepted.
    pub fn is_applied(&self) -> bool {
        matches!(self, PromoResult::Applied(_))
    }
}

/// Fixed table of promo rules.
#[derive(Debug, Clone)]
pub struct PromoTable {
    rules: SmallVec<[AppliedPromo; 4]>,
}

impl PromoTable {
    /// Create an empty table, which rejects every code.
    pub fn empty() -> Self {
        Self {
            rules: SmallVec::new(),
        }
    }

    /// The storefront's built-in codes: `SAVE20` for 20% off and `FREE10` for 10.00 off.
    pub fn storefront(currency: &'static Currency) -> Self {
        let mut table = Self::empty();

        table.rules.push(AppliedPromo {
            code: "SAVE20".to_string(),
            discount: Discount::Percentage(Percentage::from(0.2)),
        });

        table.rules.push(AppliedPromo {
            code: "FREE10".to_string(),
            discount: Discount::Fixed(Money::from_minor(10_00, currency)),
        });

        table
    }

    /// Load a table from YAML.
    ///
    /// ```yaml
    /// promos:
    ///   - code: SAVE20
    ///     percentage: 0.2
    ///   - code: FREE10
    ///     amount: "10.00"
    /// ```
    ///
    /// Fixed amounts are read as major units of `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`PromoTableError`] if the YAML is malformed, a code is empty or repeated, or an
    /// amount cannot be converted to minor units.
    pub fn from_yaml(yaml: &str, currency: &'static Currency) -> Result<Self, PromoTableError> {
        let fixture: PromoTableFixture = serde_norway::from_str(yaml)?;
        let mut table = Self::empty();

        for rule in fixture.promos {
            let code = canonical_code(&rule.code);

            if code.is_empty() {
                return Err(PromoTableError::EmptyCode);
            }

            if table.rules.iter().any(|existing| existing.code == code) {
                return Err(PromoTableError::DuplicateCode(code));
            }

            let discount = match rule.kind {
                PromoKindFixture::Percentage(value) => Discount::Percentage(Percentage::from(value)),
                PromoKindFixture::Amount(amount) => {
                    let minor = major_to_minor(amount, currency)
                        .ok_or_else(|| PromoTableError::InvalidAmount(code.clone()))?;

                    Discount::Fixed(Money::from_minor(minor, currency))
                }
            };

            table.rules.push(AppliedPromo { code, discount });
        }

        Ok(table)
    }

    /// Evaluate a shopper-entered code against the table.
    pub fn evaluate(&self, code: &str) -> PromoResult {
        let code = canonical_code(code);

        self.rules
            .iter()
            .find(|rule| rule.code == code)
            .map_or(PromoResult::Rejected, |rule| {
                PromoResult::Applied(rule.clone())
            })
    }

    /// Number of rules in the table.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct PromoTableFixture {
    promos: Vec<PromoRuleFixture>,
}

#[derive(Debug, Deserialize)]
struct PromoRuleFixture {
    code: String,

    #[serde(flatten)]
    kind: PromoKindFixture,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PromoKindFixture {
    /// Fraction of the subtotal, e.g. `0.2` for 20%
    Percentage(Decimal),

    /// Major units, e.g. `"10.00"`
    Amount(Decimal),
}

fn canonical_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Convert a major-unit amount into whole minor units of `currency`, rounding half away from
/// zero.
///
/// Returns `None` if the result does not fit in an `i64`.
pub fn major_to_minor(amount: Decimal, currency: &'static Currency) -> Option<i64> {
    amount
        .checked_mul(Decimal::from(10_i64.checked_pow(currency.exponent)?))
        .and_then(|value| {
            value
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
        })
}
