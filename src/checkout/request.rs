//! Sale Request

use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    cart::Cart,
    payments::{Allocations, PaymentMethodId},
    pricing,
    products::ProductId,
};

/// Body of the sale creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRequest {
    /// Lines to sell.
    #[serde(rename = "items_input")]
    pub items: Vec<SaleItemInput>,

    /// Payment split.
    #[serde(rename = "payments_input")]
    pub payments: Vec<SalePaymentInput>,

    /// Whether a paper receipt was handed over.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub receipt_issued: bool,
}

/// One line of a sale request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaleItemInput {
    /// Product sold.
    pub product_id: ProductId,

    /// Units sold.
    pub quantity: u32,
}

/// One payment of a sale request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SalePaymentInput {
    /// Payment method used.
    pub method_id: PaymentMethodId,

    /// Amount paid, rounded to the currency's precision.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

impl SaleRequest {
    /// Build the request for a cart and its payment split, without validating them.
    pub fn from_checkout(cart: &Cart, allocations: &Allocations) -> Self {
        Self {
            items: cart
                .lines()
                .iter()
                .map(|line| SaleItemInput {
                    product_id: line.product().id,
                    quantity: line.quantity(),
                })
                .collect(),
            payments: allocations
                .iter()
                .map(|entry| SalePaymentInput {
                    method_id: entry.method().id,
                    amount: pricing::to_decimal(entry.amount()),
                })
                .collect(),
            receipt_issued: false,
        }
    }

    /// Mark whether a receipt was issued for the sale.
    #[must_use]
    pub fn with_receipt_issued(mut self, receipt_issued: bool) -> Self {
        self.receipt_issued = receipt_issued;
        self
    }
}
