//! Payment Method Fixtures

use serde::Deserialize;

use crate::payments::PaymentMethod;

/// Wrapper for payment methods in YAML, in listing order
#[derive(Debug, Deserialize)]
pub struct PaymentMethodsFixture {
    /// Payment methods as the backend would list them
    pub payment_methods: Vec<PaymentMethod>,
}
