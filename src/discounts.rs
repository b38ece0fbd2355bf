//! Discounts

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// A fixed discount was given in a different currency to the amount it applies to.
    #[error("discount is in {discount}, but the subtotal is in {subtotal}")]
    CurrencyMismatch {
        /// Currency of the discount amount
        discount: &'static str,

        /// Currency of the subtotal
        subtotal: &'static str,
    },
}

/// Discount granted by a promo code.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Discount {
    /// Take a percentage off the subtotal (e.g., "20% off")
    Percentage(Percentage),

    /// Take a fixed amount off the subtotal (e.g., "$10 off")
    Fixed(Money<'static, Currency>),
}

/// Calculate the amount a discount takes off `subtotal`.
///
/// The result never exceeds the subtotal and is never negative.
///
/// # Errors
///
/// - [`DiscountError::PercentConversion`]: the percentage could not be applied in minor units.
/// - [`DiscountError::CurrencyMismatch`]: a fixed discount uses another currency.
pub fn calculate_discount(
    discount: &Discount,
    subtotal: Money<'static, Currency>,
) -> Result<Money<'static, Currency>, DiscountError> {
    let subtotal_minor = subtotal.to_minor_units();

    let discount_minor = match discount {
        Discount::Percentage(percent) => percent_of_minor(percent, subtotal_minor)?,
        Discount::Fixed(amount) => {
            if amount.currency() != subtotal.currency() {
                return Err(DiscountError::CurrencyMismatch {
                    discount: amount.currency().iso_alpha_code,
                    subtotal: subtotal.currency().iso_alpha_code,
                });
            }

            amount.to_minor_units()
        }
    };

    let clamped = discount_minor.clamp(0, subtotal_minor.max(0));

    Ok(Money::from_minor(clamped, subtotal.currency()))
}

/// Calculate the share of a minor unit amount given by a percentage.
///
/// Rounds half away from zero to whole minor units.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // Percentage has no accessor for its inner Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn percentage_discount_takes_share_of_subtotal() -> TestResult {
        let discount = Discount::Percentage(Percentage::from(0.2));

        let amount = calculate_discount(&discount, Money::from_minor(100_00, USD))?;

        assert_eq!(amount, Money::from_minor(20_00, USD));

        Ok(())
    }

    #[test]
    fn fixed_discount_is_the_fixed_amount() -> TestResult {
        let discount = Discount::Fixed(Money::from_minor(10_00, USD));

        let amount = calculate_discount(&discount, Money::from_minor(100_00, USD))?;

        assert_eq!(amount, Money::from_minor(10_00, USD));

        Ok(())
    }

    #[test]
    fn fixed_discount_is_clamped_to_subtotal() -> TestResult {
        let discount = Discount::Fixed(Money::from_minor(10_00, USD));

        let amount = calculate_discount(&discount, Money::from_minor(4_50, USD))?;

        assert_eq!(amount, Money::from_minor(4_50, USD));

        Ok(())
    }

    #[test]
    fn percentage_above_one_hundred_is_clamped_to_subtotal() -> TestResult {
        let discount = Discount::Percentage(Percentage::from(1.5));

        let amount = calculate_discount(&discount, Money::from_minor(40_00, USD))?;

        assert_eq!(amount, Money::from_minor(40_00, USD));

        Ok(())
    }

    #[test]
    fn negative_fixed_discount_is_clamped_to_zero() -> TestResult {
        let discount = Discount::Fixed(Money::from_minor(-5_00, USD));

        let amount = calculate_discount(&discount, Money::from_minor(40_00, USD))?;

        assert_eq!(amount, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn discount_on_empty_subtotal_is_zero() -> TestResult {
        let discount = Discount::Fixed(Money::from_minor(10_00, USD));

        let amount = calculate_discount(&discount, Money::from_minor(0, USD))?;

        assert_eq!(amount, Money::from_minor(0, USD));

        Ok(())
    }

    #[test]
    fn fixed_discount_currency_mismatch_errors() {
        let discount = Discount::Fixed(Money::from_minor(10_00, GBP));

        let result = calculate_discount(&discount, Money::from_minor(100_00, USD));

        assert_eq!(
            result,
            Err(DiscountError::CurrencyMismatch {
                discount: GBP.iso_alpha_code,
                subtotal: USD.iso_alpha_code,
            })
        );
    }

    #[test]
    fn percent_of_minor_rounds_half_away_from_zero() -> TestResult {
        // 8% of 0.31 is 2.48 cents, 8% of 0.44 is 3.52 cents
        assert_eq!(percent_of_minor(&Percentage::from(0.08), 31)?, 2);
        assert_eq!(percent_of_minor(&Percentage::from(0.08), 44)?, 4);
        assert_eq!(percent_of_minor(&Percentage::from(0.5), 5)?, 3);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let percent = Percentage::from(2.0);
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));
    }

    #[test]
    fn percent_of_minor_checked_mul_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert!(matches!(result, Err(DiscountError::PercentConversion)));

        Ok(())
    }
}
