//! Checkout Validation
//!
//! Checks run in a fixed order and the first failure wins. Nothing here
//! touches the network; a split that fails validation is never sent.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{
    cart::Cart,
    checkout::{
        request::SaleRequest,
        summary::{CheckoutSummary, compute_checkout_summary},
    },
    payments::{ActiveMethods, Allocations, PaymentMethodId},
    pricing::TotalPriceError,
};

/// Reasons a checkout cannot be submitted.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Nothing to sell.
    #[error("Cart is empty")]
    EmptyCart,

    /// No payment split has been entered.
    #[error("Please add at least one payment method")]
    NoAllocations,

    /// The split does not cover the total.
    #[error("Payment amount must cover the total bill ({remaining} outstanding)")]
    Underpaid {
        /// Amount still owed.
        remaining: Money<'static, Currency>,
    },

    /// A method was deactivated after it was chosen.
    #[error(
        "Payment method {name} is no longer active. Please select a different payment method."
    )]
    InactiveMethod {
        /// The deactivated method.
        id: PaymentMethodId,
        /// Its display name.
        name: String,
    },

    /// An allocation has a zero amount.
    #[error("All payment amounts must be greater than zero ({name} is not)")]
    NonPositiveAmount {
        /// The offending method.
        id: PaymentMethodId,
        /// Its display name.
        name: String,
    },

    /// Wrapped total calculation error.
    #[error(transparent)]
    Total(#[from] TotalPriceError),
}

/// Runs the submission checks against the current state.
///
/// On success returns the summary the checks were made against.
///
/// # Errors
///
/// In order: [`CheckoutError::EmptyCart`], [`CheckoutError::NoAllocations`],
/// [`CheckoutError::Underpaid`], [`CheckoutError::InactiveMethod`],
/// [`CheckoutError::NonPositiveAmount`]; or [`CheckoutError::Total`] if the
/// totals cannot be computed.
pub fn validate(
    cart: &Cart,
    allocations: &Allocations,
    active: &ActiveMethods,
) -> Result<CheckoutSummary, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    if allocations.is_empty() {
        return Err(CheckoutError::NoAllocations);
    }

    let summary = compute_checkout_summary(cart, allocations)?;

    if !summary.is_fully_paid() {
        return Err(CheckoutError::Underpaid {
            remaining: *summary.remaining(),
        });
    }

    if let Some(inactive) = allocations
        .iter()
        .find(|entry| !active.contains(entry.method().id))
    {
        return Err(CheckoutError::InactiveMethod {
            id: inactive.method().id,
            name: inactive.method().name.clone(),
        });
    }

    if let Some(empty) = allocations
        .iter()
        .find(|entry| entry.amount().to_minor_units() <= 0)
    {
        return Err(CheckoutError::NonPositiveAmount {
            id: empty.method().id,
            name: empty.method().name.clone(),
        });
    }

    Ok(summary)
}

/// Validates the checkout and builds the sale request for it.
///
/// # Errors
///
/// Returns the first failing [`CheckoutError`] from [`validate`].
pub fn prepare_sale(
    cart: &Cart,
    allocations: &Allocations,
    active: &ActiveMethods,
) -> Result<SaleRequest, CheckoutError> {
    validate(cart, allocations, active)?;

    Ok(SaleRequest::from_checkout(cart, allocations))
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::ETB;
    use testresult::TestResult;

    use crate::{payments::PaymentMethod, products::Product};

    use super::*;

    fn methods() -> ActiveMethods {
        ActiveMethods::new([PaymentMethod::new(1, "Cash"), PaymentMethod::new(2, "Card")])
    }

    fn seeded() -> Result<(Cart, Allocations), Box<dyn std::error::Error>> {
        let mut cart = Cart::new(ETB);

        cart.add(Product::new(7, "Ambasha", Money::from_minor(5_000, ETB), 5))?;
        cart.increment(crate::products::ProductId::new(7))?;

        let mut allocations = Allocations::new(ETB);
        allocations.reconcile(&cart, &methods())?;

        Ok((cart, allocations))
    }

    #[test]
    fn empty_cart_is_checked_first() {
        let cart = Cart::new(ETB);
        let allocations = Allocations::new(ETB);

        assert_eq!(
            validate(&cart, &allocations, &methods()),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn missing_allocations_are_rejected() -> TestResult {
        let (cart, _) = seeded()?;

        assert_eq!(
            validate(&cart, &Allocations::new(ETB), &methods()),
            Err(CheckoutError::NoAllocations)
        );

        Ok(())
    }

    #[test]
    fn underpayment_is_rejected() -> TestResult {
        let (cart, mut allocations) = seeded()?;

        allocations.add(&methods());
        allocations.update_amount(1, Decimal::from(30))?;
        allocations.update_amount(0, Decimal::from(40))?;

        assert_eq!(
            validate(&cart, &allocations, &methods()),
            Err(CheckoutError::Underpaid {
                remaining: Money::from_minor(3_000, ETB)
            })
        );

        Ok(())
    }

    #[test]
    fn underpayment_wins_over_inactive_method() -> TestResult {
        let (cart, mut allocations) = seeded()?;

        allocations.update_amount(0, Decimal::from(10))?;

        let result = validate(&cart, &allocations, &ActiveMethods::default());

        assert!(
            matches!(result, Err(CheckoutError::Underpaid { .. })),
            "expected Underpaid, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn deactivated_method_is_rejected() -> TestResult {
        let (cart, allocations) = seeded()?;
        let card_only = ActiveMethods::new([PaymentMethod::new(2, "Card")]);

        assert_eq!(
            validate(&cart, &allocations, &card_only),
            Err(CheckoutError::InactiveMethod {
                id: PaymentMethodId::new(1),
                name: "Cash".to_string(),
            })
        );

        Ok(())
    }

    #[test]
    fn zero_amount_row_is_rejected() -> TestResult {
        let (cart, mut allocations) = seeded()?;

        allocations.add(&methods());

        assert_eq!(
            validate(&cart, &allocations, &methods()),
            Err(CheckoutError::NonPositiveAmount {
                id: PaymentMethodId::new(2),
                name: "Card".to_string(),
            })
        );

        Ok(())
    }

    #[test]
    fn overpayment_is_allowed() -> TestResult {
        let (cart, mut allocations) = seeded()?;

        allocations.update_amount(0, Decimal::from(150))?;

        let summary = validate(&cart, &allocations, &methods())?;

        assert_eq!(summary.change_due(), Some(Money::from_minor(5_000, ETB)));

        Ok(())
    }

    #[test]
    fn prepare_sale_builds_request() -> TestResult {
        let (cart, allocations) = seeded()?;

        let request = prepare_sale(&cart, &allocations, &methods())?;

        assert_eq!(request.items.len(), 1);
        assert_eq!(request.payments.len(), 1);

        Ok(())
    }
}
