//! Bakehouse
//!
//! Bakehouse is the checkout core of a bakery point-of-sale: a stock-aware
//! cart, a payment split across several methods that keeps itself in line
//! with the cart total and the set of active payment methods, and the
//! validation that guards submitting the sale.

pub mod cart;
pub mod checkout;
pub mod fixtures;
pub mod ids;
pub mod payments;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod vendors;
