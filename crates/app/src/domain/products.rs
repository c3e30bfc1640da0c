//! Products service.

use async_trait::async_trait;
use bakehouse::{
    pricing,
    products::{Product, ProductId},
};
use mockall::automock;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;

use crate::client::{ApiClient, ClientError, ItemEnvelope};

/// Errors turning a product record into a sellable product.
#[derive(Debug, Error, PartialEq)]
pub enum ProductRecordError {
    /// The price does not fit the currency's minor units.
    #[error("product {0} has an out of range price: {1}")]
    InvalidPrice(ProductId, Decimal),
}

/// Product as returned by `GET /production/products/{id}/`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    /// Backend id
    pub id: ProductId,

    /// Display name
    pub name: String,

    /// Unit sale price; sent as a string or a number
    pub selling_price: Decimal,

    /// Units on hand; may be negative after manual stock corrections
    #[serde(default)]
    pub stock_quantity: i64,

    /// Whether the product may still be sold
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

fn active_by_default() -> bool {
    true
}

impl ProductRecord {
    /// Convert into a cart product priced in `currency`.
    ///
    /// Negative stock is treated as none.
    ///
    /// # Errors
    ///
    /// Returns [`ProductRecordError::InvalidPrice`] if the price cannot be
    /// represented in minor units.
    pub fn into_product(self, currency: &'static Currency) -> Result<Product, ProductRecordError> {
        let minor = pricing::to_minor_units(self.selling_price, currency)
            .ok_or(ProductRecordError::InvalidPrice(self.id, self.selling_price))?;

        let stock = u32::try_from(self.stock_quantity.max(0)).unwrap_or(u32::MAX);

        Ok(Product::new(
            self.id.get(),
            self.name,
            Money::from_minor(minor, currency),
            stock,
        ))
    }
}

/// Products backed by the bakery API.
#[derive(Debug, Clone)]
pub struct HttpProductsService {
    client: ApiClient,
}

impl HttpProductsService {
    /// Create a service using `client`.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProductsService for HttpProductsService {
    #[tracing::instrument(name = "products.get", skip(self), fields(product_id = %product), err)]
    async fn get_product(&self, product: ProductId) -> Result<ProductRecord, ClientError> {
        let record = self
            .client
            .get_json::<ItemEnvelope<ProductRecord>>(
                &format!("/production/products/{product}/"),
                &[],
            )
            .await?
            .into_inner();

        Ok(record)
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<ProductRecord, ClientError>;
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::ETB;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn record_accepts_string_decimals() -> TestResult {
        let record: ProductRecord = serde_json::from_str(
            r#"{
                "id": 3,
                "name": "Ambasha",
                "selling_price": "80.00",
                "stock_quantity": 4,
                "is_active": true,
                "created_at": "2024-01-01T00:00:00Z"
            }"#,
        )?;

        let product = record.into_product(ETB)?;

        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.selling_price, Money::from_minor(8_000, ETB));
        assert_eq!(product.stock_quantity, 4);

        Ok(())
    }

    #[test]
    fn record_defaults_to_active_and_clamps_negative_stock() -> TestResult {
        let record: ProductRecord = serde_json::from_str(
            r#"{"id": 5, "name": "Kita", "selling_price": 12.5, "stock_quantity": -2}"#,
        )?;

        assert!(record.is_active);

        let product = record.into_product(ETB)?;

        assert_eq!(product.stock_quantity, 0);
        assert_eq!(product.selling_price, Money::from_minor(1_250, ETB));

        Ok(())
    }
}
