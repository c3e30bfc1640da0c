//! Checkout Summary

use rusty_money::{Money, iso::Currency};

use crate::{
    cart::Cart,
    payments::Allocations,
    pricing::TotalPriceError,
};

/// Totals derived from a cart and its payment split. Never stored; always
/// recomputed from the source collections.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSummary {
    total: Money<'static, Currency>,
    paid: Money<'static, Currency>,
    remaining: Money<'static, Currency>,
}

impl CheckoutSummary {
    /// Sum of every cart line.
    pub fn total(&self) -> &Money<'static, Currency> {
        &self.total
    }

    /// Sum of every allocation.
    pub fn paid(&self) -> &Money<'static, Currency> {
        &self.paid
    }

    /// `total - paid`; negative when the customer overpaid.
    pub fn remaining(&self) -> &Money<'static, Currency> {
        &self.remaining
    }

    /// Whether the split covers the total.
    pub fn is_fully_paid(&self) -> bool {
        self.remaining.to_minor_units() <= 0
    }

    /// Change to hand back when the split exceeds the total.
    pub fn change_due(&self) -> Option<Money<'static, Currency>> {
        let remaining = self.remaining.to_minor_units();

        (remaining < 0).then(|| Money::from_minor(-remaining, self.remaining.currency()))
    }
}

/// Computes the totals for a cart and its payment split.
///
/// # Errors
///
/// Returns a [`TotalPriceError`] if a total overflows or a cart line is
/// priced in another currency than the split.
pub fn compute_checkout_summary(
    cart: &Cart,
    allocations: &Allocations,
) -> Result<CheckoutSummary, TotalPriceError> {
    let total = cart.total()?;
    let paid = allocations.paid()?;

    if cart.currency() != allocations.currency() {
        return Err(TotalPriceError::CurrencyMismatchAllocations(
            cart.currency().iso_alpha_code,
            allocations.currency().iso_alpha_code,
        ));
    }

    let remaining = total
        .to_minor_units()
        .checked_sub(paid.to_minor_units())
        .ok_or(TotalPriceError::Overflow)?;

    Ok(CheckoutSummary {
        total,
        paid,
        remaining: Money::from_minor(remaining, cart.currency()),
    })
}
