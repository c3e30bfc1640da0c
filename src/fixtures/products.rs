//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Findable, Money, iso::Currency};
use serde::Deserialize;

use crate::{fixtures::FixtureError, pricing, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Backend product id
    pub id: u64,

    /// Product name
    pub name: String,

    /// Selling price (e.g., "50.00 ETB")
    pub price: String,

    /// Units on hand
    pub stock: u32,
}

impl TryFrom<ProductFixture> for Product {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;

        Ok(Product::new(
            fixture.id,
            fixture.name,
            Money::from_minor(minor_units, currency),
            fixture.stock,
        ))
    }
}

/// Parse price string (e.g., "50.00 ETB") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not an ISO 4217 code.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = Currency::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency(currency_code.to_string()))?;

    let minor_units = pricing::to_minor_units(amount, currency)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ETB, USD};

    use super::*;

    #[test]
    fn parse_price_reads_amount_and_currency() -> Result<(), FixtureError> {
        assert_eq!(parse_price("50.00 ETB")?, (5_000, ETB));
        assert_eq!(parse_price("1.5 USD")?, (150, USD));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("50.00ETB");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_trailing_parts() {
        let result = parse_price("50.00 ETB each");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }
}
