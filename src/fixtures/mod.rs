//! Fixtures
//!
//! YAML catalogues of products and payment methods used by tests. A set
//! named `bakery` lives in
//! `fixtures/products/bakery.yml` and `fixtures/payment_methods/bakery.yml`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    fixtures::{payment_methods::PaymentMethodsFixture, products::ProductsFixture},
    payments::{ActiveMethods, Allocations, PaymentMethod},
    products::Product,
};

pub mod payment_methods;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Cart creation error
    #[error("Failed to fill cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// String key -> product
    products: FxHashMap<String, Product>,

    /// Payment methods in listing order, inactive ones included
    payment_methods: Vec<PaymentMethod>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            payment_methods: Vec::new(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (key, product_fixture) in fixture.products {
            let product: Product = product_fixture.try_into()?;
            let currency = product.selling_price.currency();

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load payment methods from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_payment_methods(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self
            .base_path
            .join("payment_methods")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: PaymentMethodsFixture = serde_norway::from_str(&contents)?;

        self.payment_methods.extend(fixture.payment_methods);

        Ok(self)
    }

    /// Load a complete fixture set (products and payment methods with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_products(name)?.load_payment_methods(name)?;

        Ok(fixture)
    }

    /// Get a product by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Every payment method in the fixture, inactive ones included
    pub fn payment_methods(&self) -> &[PaymentMethod] {
        &self.payment_methods
    }

    /// Snapshot of the active payment methods
    pub fn active_methods(&self) -> ActiveMethods {
        self.payment_methods.iter().cloned().collect()
    }

    /// Create a cart by adding each product key once; repeated keys add another unit.
    ///
    /// # Errors
    ///
    /// Returns an error if no products are loaded, a key is unknown, or a
    /// product cannot be added.
    pub fn cart(&self, keys: &[&str]) -> Result<Cart, FixtureError> {
        let mut cart = Cart::new(self.currency()?);

        for key in keys {
            cart.add(self.product(key)?.clone())?;
        }

        Ok(cart)
    }

    /// An empty payment split in the fixture currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn allocations(&self) -> Result<Allocations, FixtureError> {
        Ok(Allocations::new(self.currency()?))
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
