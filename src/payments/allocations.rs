//! Payment Allocations
//!
//! Splits a cart total across one or more payment methods. No two rows ever
//! share a method. A freshly opened checkout is seeded with a single row
//! covering the whole total; that row follows the total while the cashier
//! leaves it alone and is frozen by the first manual edit.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    cart::Cart,
    payments::methods::{ActiveMethods, PaymentMethod, PaymentMethodId},
    pricing::{self, TotalPriceError},
};

/// Errors raised by allocation edits.
#[derive(Debug, Error, PartialEq)]
pub enum AllocationError {
    /// No allocation row at the given index.
    #[error("no payment allocation at index {0}")]
    NoSuchAllocation(usize),

    /// The requested method is not in the active set.
    #[error("payment method {0} is not active")]
    InactiveMethod(PaymentMethodId),

    /// Another row already uses the requested method.
    #[error("payment method {0} is already used by another allocation")]
    MethodInUse(PaymentMethodId),

    /// The amount cannot be represented in the allocation currency.
    #[error("amount {0} is out of range")]
    AmountOutOfRange(Decimal),

    /// Wrapped total calculation error.
    #[error(transparent)]
    Total(#[from] TotalPriceError),
}

/// Whether the allocations still follow the cart total.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncState {
    /// Nothing has been seeded yet.
    Unseeded,

    /// A single row was auto-filled with `last_auto` and has not been touched.
    Seeded {
        /// The amount the row was last auto-filled with.
        last_auto: Money<'static, Currency>,
    },

    /// The cashier changed the allocations; auto-sync is off.
    Edited,
}

/// One payment method and the amount paid with it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentAllocation {
    method: PaymentMethod,
    amount: Money<'static, Currency>,
}

impl PaymentAllocation {
    /// The payment method.
    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    /// The amount paid with this method.
    pub fn amount(&self) -> &Money<'static, Currency> {
        &self.amount
    }
}

/// What a reconciliation pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Rows dropped because their method is no longer active.
    pub pruned: usize,

    /// Whether a first allocation was seeded.
    pub seeded: bool,

    /// Whether the seeded allocation followed a new total.
    pub synced: bool,
}

impl ReconcileOutcome {
    /// Whether the pass left everything as it was.
    pub fn is_noop(&self) -> bool {
        self.pruned == 0 && !self.seeded && !self.synced
    }
}

/// The payment split for one checkout.
#[derive(Debug, Clone)]
pub struct Allocations {
    entries: SmallVec<[PaymentAllocation; 4]>,
    sync: SyncState,
    currency: &'static Currency,
}

impl Allocations {
    /// Create an empty, unseeded split in `currency`.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            entries: SmallVec::new(),
            sync: SyncState::Unseeded,
            currency,
        }
    }

    /// Append a row for the first active method no row uses yet, with a zero amount.
    ///
    /// Returns the new row's index, or `None` when every active method is
    /// already allocated (or none exist).
    pub fn add(&mut self, active: &ActiveMethods) -> Option<usize> {
        let method = active
            .iter()
            .find(|method| !self.uses(method.id, None))?
            .clone();

        let amount = self.zero();

        self.entries.push(PaymentAllocation { method, amount });

        self.sync = SyncState::Edited;

        Some(self.entries.len() - 1)
    }

    /// Delete the row at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::NoSuchAllocation`] if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<PaymentAllocation, AllocationError> {
        if index >= self.entries.len() {
            return Err(AllocationError::NoSuchAllocation(index));
        }

        self.sync = SyncState::Edited;

        Ok(self.entries.remove(index))
    }

    /// Reassign the method of the row at `index`.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NoSuchAllocation`]: `index` is out of range.
    /// - [`AllocationError::InactiveMethod`]: `method` is not active.
    /// - [`AllocationError::MethodInUse`]: another row already uses `method`.
    pub fn update_method(
        &mut self,
        index: usize,
        method: PaymentMethodId,
        active: &ActiveMethods,
    ) -> Result<(), AllocationError> {
        if index >= self.entries.len() {
            return Err(AllocationError::NoSuchAllocation(index));
        }

        let chosen = active
            .get(method)
            .ok_or(AllocationError::InactiveMethod(method))?
            .clone();

        if self.uses(method, Some(index)) {
            return Err(AllocationError::MethodInUse(method));
        }

        self.entry_mut(index)?.method = chosen;
        self.sync = SyncState::Edited;

        Ok(())
    }

    /// Set the amount of the row at `index`. Negative amounts become zero.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NoSuchAllocation`]: `index` is out of range.
    /// - [`AllocationError::AmountOutOfRange`]: the amount does not fit in minor units.
    pub fn update_amount(&mut self, index: usize, amount: Decimal) -> Result<(), AllocationError> {
        let currency = self.currency;
        let entry = self.entry_mut(index)?;
        let minor = pricing::to_minor_units(amount.max(Decimal::ZERO), currency)
            .ok_or(AllocationError::AmountOutOfRange(amount))?;

        entry.amount = Money::from_minor(minor, currency);
        self.sync = SyncState::Edited;

        Ok(())
    }

    /// Add whatever is still owed to the row at `index`.
    ///
    /// Does nothing when the total is already covered. Returns whether the
    /// row changed.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::NoSuchAllocation`]: `index` is out of range.
    /// - [`AllocationError::Total`]: the sums overflow.
    pub fn fill_remaining(
        &mut self,
        index: usize,
        total: &Money<'static, Currency>,
    ) -> Result<bool, AllocationError> {
        if index >= self.entries.len() {
            return Err(AllocationError::NoSuchAllocation(index));
        }

        let remaining = total
            .to_minor_units()
            .checked_sub(self.paid()?.to_minor_units())
            .ok_or(TotalPriceError::Overflow)?;

        if remaining <= 0 {
            return Ok(false);
        }

        let currency = self.currency;
        let entry = self.entry_mut(index)?;
        let filled = entry
            .amount
            .to_minor_units()
            .checked_add(remaining)
            .ok_or(TotalPriceError::Overflow)?;

        entry.amount = Money::from_minor(filled, currency);
        self.sync = SyncState::Edited;

        Ok(true)
    }

    /// Methods the row at `index` may switch to: every active method not
    /// chosen by another row.
    pub fn candidates<'a>(
        &self,
        index: usize,
        active: &'a ActiveMethods,
    ) -> Vec<&'a PaymentMethod> {
        active
            .iter()
            .filter(|method| !self.uses(method.id, Some(index)))
            .collect()
    }

    /// Drop every row whose method is no longer active. Returns how many were dropped.
    pub fn prune(&mut self, active: &ActiveMethods) -> usize {
        let before = self.entries.len();

        self.entries.retain(|entry| active.contains(entry.method.id));

        before - self.entries.len()
    }

    /// Bring the split in line with the cart and the active methods.
    ///
    /// Inactive rows are pruned first. An unseeded split with a non-empty cart
    /// and at least one active method is then seeded with one row covering
    /// the total; a seeded, untouched row follows the total when it changes.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::Total`] if the cart total cannot be calculated.
    pub fn reconcile(
        &mut self,
        cart: &Cart,
        active: &ActiveMethods,
    ) -> Result<ReconcileOutcome, AllocationError> {
        let mut outcome = ReconcileOutcome {
            pruned: self.prune(active),
            ..ReconcileOutcome::default()
        };

        // A pruned seeded row is not replaced.
        if outcome.pruned > 0 && matches!(self.sync, SyncState::Seeded { .. }) {
            self.sync = SyncState::Edited;
        }

        let total = cart.total()?;

        match self.sync {
            SyncState::Unseeded => {
                if let Some(first) = active.first().filter(|_| !cart.is_empty()) {
                    self.entries.clear();
                    self.entries.push(PaymentAllocation {
                        method: first.clone(),
                        amount: total,
                    });

                    self.sync = SyncState::Seeded { last_auto: total };
                    outcome.seeded = true;
                }
            }
            SyncState::Seeded { last_auto } if total != last_auto => {
                if let [entry] = self.entries.as_mut_slice() {
                    if entry.amount == last_auto {
                        entry.amount = total;
                        self.sync = SyncState::Seeded { last_auto: total };
                        outcome.synced = true;
                    }
                }
            }
            SyncState::Seeded { .. } | SyncState::Edited => {}
        }

        Ok(outcome)
    }

    /// Sum of all allocated amounts.
    ///
    /// # Errors
    ///
    /// Returns [`TotalPriceError::Overflow`] if the sum does not fit.
    pub fn paid(&self) -> Result<Money<'static, Currency>, TotalPriceError> {
        pricing::sum(self.entries.iter().map(PaymentAllocation::amount), self.currency)
    }

    /// Forget every row and start unseeded again.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.sync = SyncState::Unseeded;
    }

    /// The row at `index`.
    pub fn get(&self, index: usize) -> Option<&PaymentAllocation> {
        self.entries.get(index)
    }

    /// Iterate rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &PaymentAllocation> {
        self.entries.iter()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current auto-sync state.
    pub fn sync_state(&self) -> &SyncState {
        &self.sync
    }

    /// Currency of the split.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn uses(&self, method: PaymentMethodId, except: Option<usize>) -> bool {
        self.entries
            .iter()
            .enumerate()
            .any(|(idx, entry)| Some(idx) != except && entry.method.id == method)
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut PaymentAllocation, AllocationError> {
        self.entries
            .get_mut(index)
            .ok_or(AllocationError::NoSuchAllocation(index))
    }

    fn zero(&self) -> Money<'static, Currency> {
        Money::from_minor(0, self.currency)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rusty_money::iso::ETB;
    use testresult::TestResult;

    use crate::products::{Product, ProductId};

    use super::*;

    fn methods() -> ActiveMethods {
        ActiveMethods::new([
            PaymentMethod::new(1, "Cash"),
            PaymentMethod::new(2, "Card"),
            PaymentMethod::new(3, "Telebirr"),
        ])
    }

    fn cart_of(price_minor: i64, quantity: u32) -> Result<Cart, crate::cart::CartError> {
        let mut cart = Cart::new(ETB);

        cart.add(Product::new(1, "Sourdough", Money::from_minor(price_minor, ETB), 50))?;
        cart.set_quantity(ProductId::new(1), quantity)?;

        Ok(cart)
    }

    fn etb(minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, ETB)
    }

    fn method_ids(allocations: &Allocations) -> Vec<u64> {
        allocations.iter().map(|entry| entry.method().id.get()).collect()
    }

    #[test]
    fn reconcile_seeds_first_method_with_total() -> TestResult {
        let cart = cart_of(5_000, 2)?;
        let mut allocations = Allocations::new(ETB);

        let outcome = allocations.reconcile(&cart, &methods())?;

        assert!(outcome.seeded);
        assert_eq!(method_ids(&allocations), [1]);
        assert_eq!(allocations.get(0).map(|a| *a.amount()), Some(etb(10_000)));
        assert_eq!(
            allocations.sync_state(),
            &SyncState::Seeded {
                last_auto: etb(10_000)
            }
        );

        Ok(())
    }

    #[test]
    fn reconcile_does_not_seed_empty_cart_or_without_methods() -> TestResult {
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&Cart::new(ETB), &methods())?;
        assert!(allocations.is_empty());

        allocations.reconcile(&cart_of(5_000, 1)?, &ActiveMethods::default())?;
        assert!(allocations.is_empty());
        assert_eq!(allocations.sync_state(), &SyncState::Unseeded);

        Ok(())
    }

    #[test]
    fn repeated_reconcile_is_idempotent() -> TestResult {
        let cart = cart_of(5_000, 2)?;
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&cart, &methods())?;

        for _ in 0..5 {
            let outcome = allocations.reconcile(&cart, &methods())?;

            assert!(outcome.is_noop(), "unexpected change: {outcome:?}");
        }

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations.paid()?, etb(10_000));

        Ok(())
    }

    #[test]
    fn seeded_row_follows_total_until_edited() -> TestResult {
        let mut cart = cart_of(5_000, 2)?;
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&cart, &methods())?;

        cart.set_quantity(ProductId::new(1), 3)?;
        let outcome = allocations.reconcile(&cart, &methods())?;

        assert!(outcome.synced);
        assert_eq!(allocations.paid()?, etb(15_000));

        allocations.update_amount(0, Decimal::from(100))?;
        cart.set_quantity(ProductId::new(1), 4)?;
        allocations.reconcile(&cart, &methods())?;

        assert_eq!(allocations.paid()?, etb(10_000));
        assert_eq!(allocations.sync_state(), &SyncState::Edited);

        Ok(())
    }

    #[test]
    fn add_picks_first_unused_method_and_stops_when_exhausted() -> TestResult {
        let mut allocations = Allocations::new(ETB);
        let active = methods();

        allocations.reconcile(&cart_of(5_000, 1)?, &active)?;

        assert_eq!(allocations.add(&active), Some(1));
        assert_eq!(allocations.add(&active), Some(2));
        assert_eq!(allocations.add(&active), None);
        assert_eq!(method_ids(&allocations), [1, 2, 3]);
        assert_eq!(allocations.get(2).map(|a| *a.amount()), Some(etb(0)));

        Ok(())
    }

    #[test]
    fn add_without_active_methods_is_noop() {
        let mut allocations = Allocations::new(ETB);

        assert_eq!(allocations.add(&ActiveMethods::default()), None);
        assert!(allocations.is_empty());
    }

    #[test]
    fn update_method_rejects_duplicates_and_inactive() -> TestResult {
        let mut allocations = Allocations::new(ETB);
        let active = methods();

        allocations.add(&active);
        allocations.add(&active);

        assert_eq!(
            allocations.update_method(1, PaymentMethodId::new(1), &active),
            Err(AllocationError::MethodInUse(PaymentMethodId::new(1)))
        );
        assert_eq!(
            allocations.update_method(1, PaymentMethodId::new(9), &active),
            Err(AllocationError::InactiveMethod(PaymentMethodId::new(9)))
        );
        assert_eq!(
            allocations.update_method(7, PaymentMethodId::new(3), &active),
            Err(AllocationError::NoSuchAllocation(7))
        );

        allocations.update_method(1, PaymentMethodId::new(3), &active)?;
        allocations.update_method(0, PaymentMethodId::new(1), &active)?;

        assert_eq!(method_ids(&allocations), [1, 3]);

        Ok(())
    }

    #[test]
    fn candidates_exclude_other_rows() {
        let mut allocations = Allocations::new(ETB);
        let active = methods();

        allocations.add(&active);
        allocations.add(&active);

        let ids: Vec<u64> = allocations
            .candidates(0, &active)
            .iter()
            .map(|method| method.id.get())
            .collect();

        assert_eq!(ids, [1, 3]);
    }

    #[test]
    fn update_amount_clamps_negative_and_rounds() -> TestResult {
        let mut allocations = Allocations::new(ETB);

        allocations.add(&methods());

        allocations.update_amount(0, Decimal::from(-25))?;
        assert_eq!(allocations.paid()?, etb(0));

        allocations.update_amount(0, Decimal::from_str("12.345")?)?;
        assert_eq!(allocations.paid()?, etb(1_235));

        Ok(())
    }

    #[test]
    fn fill_remaining_tops_up_row() -> TestResult {
        let cart = cart_of(5_000, 2)?;
        let mut allocations = Allocations::new(ETB);
        let active = methods();

        allocations.reconcile(&cart, &active)?;
        allocations.add(&active);
        allocations.update_amount(1, Decimal::from(30))?;
        allocations.update_amount(0, Decimal::from(40))?;

        assert!(allocations.fill_remaining(1, &cart.total()?)?);
        assert_eq!(allocations.get(1).map(|a| *a.amount()), Some(etb(6_000)));
        assert_eq!(allocations.paid()?, etb(10_000));

        assert!(!allocations.fill_remaining(0, &cart.total()?)?);

        Ok(())
    }

    #[test]
    fn prune_drops_only_inactive_rows() -> TestResult {
        let mut allocations = Allocations::new(ETB);
        let active = methods();

        allocations.add(&active);
        allocations.add(&active);
        allocations.add(&active);
        allocations.update_amount(0, Decimal::from(10))?;
        allocations.update_amount(2, Decimal::from(30))?;

        let without_card = ActiveMethods::new([
            PaymentMethod::new(1, "Cash"),
            PaymentMethod::new(3, "Telebirr"),
        ]);

        assert_eq!(allocations.prune(&without_card), 1);
        assert_eq!(method_ids(&allocations), [1, 3]);
        assert_eq!(allocations.paid()?, etb(4_000));

        Ok(())
    }

    #[test]
    fn pruning_seeded_row_does_not_reseed() -> TestResult {
        let cart = cart_of(5_000, 2)?;
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&cart, &methods())?;

        let card_only = ActiveMethods::new([PaymentMethod::new(2, "Card")]);
        let outcome = allocations.reconcile(&cart, &card_only)?;

        assert_eq!(outcome.pruned, 1);
        assert!(!outcome.seeded);
        assert!(allocations.is_empty());
        assert_eq!(allocations.paid()?, etb(0));
        assert_eq!(allocations.sync_state(), &SyncState::Edited);

        let outcome = allocations.reconcile(&cart, &methods())?;

        assert!(!outcome.seeded);
        assert!(allocations.is_empty());

        Ok(())
    }

    #[test]
    fn update_amount_checks_row_before_amount() -> TestResult {
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&cart_of(5_000, 1)?, &methods())?;

        assert_eq!(
            allocations.update_amount(3, Decimal::MAX),
            Err(AllocationError::NoSuchAllocation(3))
        );
        assert_eq!(
            allocations.update_amount(0, Decimal::MAX),
            Err(AllocationError::AmountOutOfRange(Decimal::MAX))
        );

        Ok(())
    }

    #[test]
    fn remove_marks_edited() -> TestResult {
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&cart_of(5_000, 1)?, &methods())?;
        allocations.remove(0)?;

        assert_eq!(allocations.sync_state(), &SyncState::Edited);
        assert_eq!(
            allocations.remove(0),
            Err(AllocationError::NoSuchAllocation(0))
        );

        Ok(())
    }

    #[test]
    fn reset_returns_to_unseeded() -> TestResult {
        let cart = cart_of(5_000, 1)?;
        let mut allocations = Allocations::new(ETB);

        allocations.reconcile(&cart, &methods())?;
        allocations.add(&methods());
        allocations.reset();

        assert!(allocations.is_empty());
        assert_eq!(allocations.sync_state(), &SyncState::Unseeded);
        assert!(allocations.reconcile(&cart, &methods())?.seeded);

        Ok(())
    }
}
