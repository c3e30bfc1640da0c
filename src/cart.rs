//! Cart
//!
//! The lines a cashier intends to sell. Every line keeps its quantity within
//! `1..=stock_quantity`; operations that would leave that range clamp or do
//! nothing instead.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    pricing::{TotalPriceError, line_total, total_price},
    products::{Product, ProductId},
};

/// Errors related to cart mutations.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// The product has no line in the cart.
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),

    /// The product has no stock left to sell.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// A product is priced in another currency (product, its currency, cart currency).
    #[error("product {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(ProductId, &'static str, &'static str),
}

/// A product and the number of units being sold.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// The product on this line.
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Units being sold.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `quantity * selling_price`.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if the line total overflows.
    pub fn line_total(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        line_total(self.product.id, &self.product.selling_price, self.quantity)
    }

    fn max_quantity(&self) -> u32 {
        self.product.stock_quantity.max(1)
    }
}

/// Cart
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart priced in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
        }
    }

    /// Add one unit of `product`, creating its line if needed.
    ///
    /// Returns the line's quantity afterwards. Adding beyond the available
    /// stock leaves the quantity unchanged.
    ///
    /// # Errors
    ///
    /// - [`CartError::OutOfStock`]: the product has no stock.
    /// - [`CartError::CurrencyMismatch`]: the product is priced in another currency.
    pub fn add(&mut self, product: Product) -> Result<u32, CartError> {
        let product_currency = product.selling_price.currency();

        if product_currency != self.currency {
            return Err(CartError::CurrencyMismatch(
                product.id,
                product_currency.iso_alpha_code,
                self.currency.iso_alpha_code,
            ));
        }

        if !product.in_stock() {
            return Err(CartError::OutOfStock(product.id));
        }

        if self.contains(product.id) {
            return self.increment(product.id);
        }

        self.lines.push(CartLine {
            product,
            quantity: 1,
        });

        Ok(1)
    }

    /// Increase a line by one unit, up to the product's stock.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn increment(&mut self, product: ProductId) -> Result<u32, CartError> {
        let line = self.line_mut(product)?;

        if line.quantity < line.max_quantity() {
            line.quantity += 1;
        }

        Ok(line.quantity)
    }

    /// Decrease a line by one unit. A line at one unit is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn decrement(&mut self, product: ProductId) -> Result<u32, CartError> {
        let line = self.line_mut(product)?;

        if line.quantity > 1 {
            line.quantity -= 1;
        }

        Ok(line.quantity)
    }

    /// Set a line's quantity, clamped into `1..=stock_quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> Result<u32, CartError> {
        let line = self.line_mut(product)?;

        line.quantity = quantity.clamp(1, line.max_quantity());

        Ok(line.quantity)
    }

    /// Set a line's quantity from raw text typed into a quantity field.
    ///
    /// Blank or non-numeric text leaves the line untouched and returns
    /// `Ok(None)`, so a half-typed value never changes the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn set_quantity_input(
        &mut self,
        product: ProductId,
        input: &str,
    ) -> Result<Option<u32>, CartError> {
        if !self.contains(product) {
            return Err(CartError::NotInCart(product));
        }

        let Ok(parsed) = input.trim().parse::<i64>() else {
            return Ok(None);
        };

        let quantity = u32::try_from(parsed.max(1)).unwrap_or(u32::MAX);

        self.set_quantity(product, quantity).map(Some)
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product has no line.
    pub fn remove(&mut self, product: ProductId) -> Result<CartLine, CartError> {
        let idx = self
            .lines
            .iter()
            .position(|line| line.product.id == product)
            .ok_or(CartError::NotInCart(product))?;

        Ok(self.lines.remove(idx))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Calculate the total of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`TotalPriceError`] if a line total or the sum overflows.
    pub fn total(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        total_price(&self.lines, self.currency)
    }

    /// The line for `product`, if any.
    pub fn line(&self, product: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id == product)
    }

    /// Whether `product` has a line.
    pub fn contains(&self, product: ProductId) -> bool {
        self.line(product).is_some()
    }

    /// Lines in the order they were added.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn line_mut(&mut self, product: ProductId) -> Result<&mut CartLine, CartError> {
        self.lines
            .iter_mut()
            .find(|line| line.product.id == product)
            .ok_or(CartError::NotInCart(product))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{ETB, USD};
    use testresult::TestResult;

    use super::*;

    fn baguette() -> Product {
        Product::new(1, "Baguette", Money::from_minor(5_000, ETB), 3)
    }

    fn croissant() -> Product {
        Product::new(2, "Croissant", Money::from_minor(1_250, ETB), 10)
    }

    #[test]
    fn add_creates_line_then_increments() -> TestResult {
        let mut cart = Cart::new(ETB);

        assert_eq!(cart.add(baguette())?, 1);
        assert_eq!(cart.add(baguette())?, 2);
        assert_eq!(cart.len(), 1);

        Ok(())
    }

    #[test]
    fn add_out_of_stock_errors() {
        let mut cart = Cart::new(ETB);
        let product = Product::new(5, "Sold out", Money::from_minor(100, ETB), 0);

        assert_eq!(
            cart.add(product),
            Err(CartError::OutOfStock(ProductId::new(5)))
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn add_currency_mismatch_errors() {
        let mut cart = Cart::new(ETB);
        let product = Product::new(6, "Import", Money::from_minor(100, USD), 4);

        assert_eq!(
            cart.add(product),
            Err(CartError::CurrencyMismatch(ProductId::new(6), "USD", "ETB"))
        );
    }

    #[test]
    fn increment_stops_at_stock() -> TestResult {
        let mut cart = Cart::new(ETB);
        let id = ProductId::new(1);

        cart.add(baguette())?;

        for _ in 0..10 {
            cart.increment(id)?;
        }

        assert_eq!(cart.line(id).map(CartLine::quantity), Some(3));

        Ok(())
    }

    #[test]
    fn decrement_never_drops_below_one() -> TestResult {
        let mut cart = Cart::new(ETB);
        let id = ProductId::new(2);

        cart.add(croissant())?;
        cart.increment(id)?;

        assert_eq!(cart.decrement(id)?, 1);
        assert_eq!(cart.decrement(id)?, 1);
        assert!(cart.contains(id), "decrement must not remove the line");

        Ok(())
    }

    #[test]
    fn set_quantity_clamps_into_stock_range() -> TestResult {
        let mut cart = Cart::new(ETB);
        let id = ProductId::new(1);

        cart.add(baguette())?;

        assert_eq!(cart.set_quantity(id, 0)?, 1);
        assert_eq!(cart.set_quantity(id, 99)?, 3);
        assert_eq!(cart.set_quantity(id, 2)?, 2);

        Ok(())
    }

    #[test]
    fn set_quantity_input_ignores_blank_and_garbage() -> TestResult {
        let mut cart = Cart::new(ETB);
        let id = ProductId::new(2);

        cart.add(croissant())?;
        cart.set_quantity(id, 4)?;

        assert_eq!(cart.set_quantity_input(id, "")?, None);
        assert_eq!(cart.set_quantity_input(id, "  ")?, None);
        assert_eq!(cart.set_quantity_input(id, "4x")?, None);
        assert_eq!(cart.line(id).map(CartLine::quantity), Some(4));

        assert_eq!(cart.set_quantity_input(id, " 7 ")?, Some(7));
        assert_eq!(cart.set_quantity_input(id, "-3")?, Some(1));

        Ok(())
    }

    #[test]
    fn operations_on_missing_product_error() {
        let mut cart = Cart::new(ETB);
        let id = ProductId::new(404);

        assert_eq!(cart.increment(id), Err(CartError::NotInCart(id)));
        assert_eq!(cart.decrement(id), Err(CartError::NotInCart(id)));
        assert_eq!(cart.set_quantity(id, 2), Err(CartError::NotInCart(id)));
        assert_eq!(cart.set_quantity_input(id, ""), Err(CartError::NotInCart(id)));
        assert_eq!(cart.remove(id), Err(CartError::NotInCart(id)));
    }

    #[test]
    fn total_tracks_every_mutation() -> TestResult {
        let mut cart = Cart::new(ETB);

        cart.add(baguette())?;
        cart.add(croissant())?;
        assert_eq!(cart.total()?, Money::from_minor(6_250, ETB));

        cart.increment(ProductId::new(1))?;
        assert_eq!(cart.total()?, Money::from_minor(11_250, ETB));

        cart.set_quantity(ProductId::new(2), 4)?;
        assert_eq!(cart.total()?, Money::from_minor(15_000, ETB));

        cart.remove(ProductId::new(1))?;
        assert_eq!(cart.total()?, Money::from_minor(5_000, ETB));

        cart.clear();
        assert_eq!(cart.total()?, Money::from_minor(0, ETB));

        Ok(())
    }
}
