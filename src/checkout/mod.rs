//! Checkout
//!
//! Derived totals for a cart and its payment split, the rules a split must
//! satisfy before a sale is sent, and the request body for the sale.

pub mod request;
pub mod summary;
pub mod validation;

pub use request::{SaleItemInput, SalePaymentInput, SaleRequest};
pub use summary::{CheckoutSummary, compute_checkout_summary};
pub use validation::{CheckoutError, prepare_sale, validate};

use crate::payments::{Allocations, SyncState};

/// Where a checkout is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    /// No allocation has been seeded yet.
    Empty,

    /// One auto-filled allocation that still follows the total.
    Seeded,

    /// The cashier has edited the split.
    Edited,

    /// A sale request is in flight.
    Submitting,
}

impl CheckoutPhase {
    /// Phase of a split, given whether a sale request is in flight.
    pub fn of(allocations: &Allocations, submitting: bool) -> Self {
        if submitting {
            return CheckoutPhase::Submitting;
        }

        if allocations.is_empty() {
            return CheckoutPhase::Empty;
        }

        match allocations.sync_state() {
            SyncState::Unseeded => CheckoutPhase::Empty,
            SyncState::Seeded { .. } => CheckoutPhase::Seeded,
            SyncState::Edited => CheckoutPhase::Edited,
        }
    }
}
