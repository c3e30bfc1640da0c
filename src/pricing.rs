//! Pricing
//!
//! All arithmetic happens in minor units so that amounts keep the currency's
//! fixed precision. Decimal user input is rounded half away from zero, the
//! same way a till rounds a typed amount.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{cart::CartLine, products::ProductId};

/// Errors that can occur while calculating totals.
#[derive(Debug, Error, PartialEq)]
pub enum TotalPriceError {
    /// A line total does not fit in minor units.
    #[error("line total for product {0} overflows")]
    LineOverflow(ProductId),

    /// A running sum does not fit in minor units.
    #[error("total overflows")]
    Overflow,

    /// A line's currency differs from the expected currency (product, line currency, expected).
    #[error("product {0} is priced in {1}, expected {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),

    /// The cart and its payment split use different currencies (cart, allocations).
    #[error("cart is priced in {0}, but payments are in {1}")]
    CurrencyMismatchAllocations(&'static str, &'static str),
}

/// Price of `quantity` units at `unit_price`.
///
/// # Errors
///
/// Returns [`TotalPriceError::LineOverflow`] when the product does not fit in minor units.
pub fn line_total(
    product: ProductId,
    unit_price: &Money<'static, Currency>,
    quantity: u32,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let minor = unit_price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(TotalPriceError::LineOverflow(product))?;

    Ok(Money::from_minor(minor, unit_price.currency()))
}

/// Calculates the total price of a list of cart lines.
///
/// An empty list totals to zero in the given currency.
///
/// # Errors
///
/// - [`TotalPriceError::CurrencyMismatch`]: a line is priced in another currency.
/// - [`TotalPriceError::LineOverflow`] / [`TotalPriceError::Overflow`]: the total does not fit.
pub fn total_price(
    lines: &[CartLine],
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let total = lines.iter().try_fold(0_i64, |acc, line| {
        let product = line.product();
        let price_currency = product.selling_price.currency();

        if price_currency != currency {
            return Err(TotalPriceError::CurrencyMismatch(
                product.id,
                price_currency.iso_alpha_code,
                currency.iso_alpha_code,
            ));
        }

        let line_minor = line_total(product.id, &product.selling_price, line.quantity())?
            .to_minor_units();

        acc.checked_add(line_minor).ok_or(TotalPriceError::Overflow)
    })?;

    Ok(Money::from_minor(total, currency))
}

/// Sum of a set of amounts, all in `currency`.
///
/// # Errors
///
/// Returns [`TotalPriceError::Overflow`] when the sum does not fit in minor units.
pub fn sum<'a>(
    amounts: impl IntoIterator<Item = &'a Money<'static, Currency>>,
    currency: &'static Currency,
) -> Result<Money<'static, Currency>, TotalPriceError> {
    let total = amounts.into_iter().try_fold(0_i64, |acc, amount| {
        acc.checked_add(amount.to_minor_units())
            .ok_or(TotalPriceError::Overflow)
    })?;

    Ok(Money::from_minor(total, currency))
}

/// Converts a decimal amount into minor units of `currency`.
///
/// Returns `None` if the rounded amount does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal, currency: &'static Currency) -> Option<i64> {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    rounded.rescale(currency.exponent);

    i64::try_from(rounded.mantissa()).ok()
}

/// Converts a money value back into a decimal with the currency's precision.
pub fn to_decimal(amount: &Money<'static, Currency>) -> Decimal {
    Decimal::new(amount.to_minor_units(), amount.currency().exponent)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rusty_money::iso::{ETB, GBP};
    use testresult::TestResult;

    use crate::{cart::Cart, products::Product};

    use super::*;

    #[test]
    fn total_price_multiplies_quantities() -> TestResult {
        let mut cart = Cart::new(ETB);

        cart.add(Product::new(1, "Baguette", Money::from_minor(5_000, ETB), 10))?;
        cart.increment(ProductId::new(1))?;
        cart.add(Product::new(2, "Croissant", Money::from_minor(1_250, ETB), 4))?;

        assert_eq!(
            total_price(cart.lines(), ETB)?,
            Money::from_minor(11_250, ETB)
        );

        Ok(())
    }

    #[test]
    fn total_price_empty_is_zero() -> TestResult {
        assert_eq!(total_price(&[], ETB)?, Money::from_minor(0, ETB));

        Ok(())
    }

    #[test]
    fn line_total_overflow_errors() {
        let price = Money::from_minor(i64::MAX, ETB);

        assert_eq!(
            line_total(ProductId::new(9), &price, 2),
            Err(TotalPriceError::LineOverflow(ProductId::new(9)))
        );
    }

    #[test]
    fn total_price_rejects_foreign_currency() -> TestResult {
        let mut cart = Cart::new(GBP);

        cart.add(Product::new(3, "Scone", Money::from_minor(250, GBP), 1))?;

        assert_eq!(
            total_price(cart.lines(), ETB),
            Err(TotalPriceError::CurrencyMismatch(ProductId::new(3), "GBP", "ETB"))
        );

        Ok(())
    }

    #[test]
    fn to_minor_units_rounds_half_away_from_zero() -> TestResult {
        assert_eq!(to_minor_units(Decimal::from_str("30.005")?, ETB), Some(3_001));
        assert_eq!(to_minor_units(Decimal::from_str("12.5")?, ETB), Some(1_250));
        assert_eq!(to_minor_units(Decimal::from(40), ETB), Some(4_000));

        Ok(())
    }

    #[test]
    fn to_decimal_keeps_two_places() -> TestResult {
        let amount = Money::from_minor(3_050, ETB);

        assert_eq!(to_decimal(&amount), Decimal::from_str("30.50")?);

        Ok(())
    }
}
