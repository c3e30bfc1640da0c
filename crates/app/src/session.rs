//! Checkout Session
//!
//! Owns the cart, the payment split and the active payment method snapshot
//! for one till. Every mutation reconciles the split before returning, so
//! callers never observe a stale seeded amount or an allocation that points
//! at a deactivated method.
//!
//! Submitting is split in two: [`CheckoutSession::begin_submit`] validates
//! and marks the session as submitting, [`CheckoutSession::finish_submit`]
//! applies the backend's answer. Cart and split edits remain possible in
//! between; a second submission is refused until the first finishes or is
//! abandoned with [`CheckoutSession::abort_submit`]. Dropping a
//! [`CheckoutSession::submit`] future mid-request abandons it the same way.

use std::fmt::{self, Debug, Formatter};

use bakehouse::{
    cart::{Cart, CartError},
    checkout::{
        CheckoutError, CheckoutPhase, CheckoutSummary, SaleRequest, compute_checkout_summary,
        prepare_sale,
    },
    payments::{
        ActiveMethods, AllocationError, Allocations, PaymentAllocation, PaymentMethod,
        PaymentMethodId, ReconcileOutcome,
    },
    pricing::TotalPriceError,
    products::{Product, ProductId},
};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    client::ClientError,
    context::AppContext,
    domain::{products::ProductRecordError, sales::SaleRecord},
};

/// Shown when the backend rejects a sale without saying why.
pub const SALE_FAILED_FALLBACK: &str = "Failed to create sale";

/// Errors raised by session edits.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Wrapped cart error.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped allocation error.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Wrapped total calculation error.
    #[error(transparent)]
    Total(#[from] TotalPriceError),

    /// Wrapped API error.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The product record cannot be sold in the session currency.
    #[error(transparent)]
    Product(#[from] ProductRecordError),

    /// The product has been deactivated.
    #[error("product {0} is no longer sold")]
    InactiveProduct(ProductId),
}

/// Reasons a sale was not recorded.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A sale request is still in flight.
    #[error("a sale is already being submitted")]
    AlreadySubmitting,

    /// The checkout failed validation; nothing was sent.
    #[error(transparent)]
    Invalid(#[from] CheckoutError),

    /// The API token was refused.
    #[error("session expired; sign in again")]
    Unauthorized,

    /// The request failed or the backend rejected the sale.
    #[error("{message}")]
    Rejected {
        /// Backend message, or [`SALE_FAILED_FALLBACK`].
        message: String,

        /// Underlying client error.
        #[source]
        source: ClientError,
    },
}

type SaleCallback = Box<dyn FnMut(&SaleRecord) + Send>;

/// One till's checkout state.
pub struct CheckoutSession {
    context: AppContext,
    cart: Cart,
    allocations: Allocations,
    active: ActiveMethods,
    submitting: bool,
    on_sale_success: Option<SaleCallback>,
}

impl CheckoutSession {
    /// Start an empty session priced in `currency`.
    pub fn new(context: AppContext, currency: &'static Currency) -> Self {
        Self {
            context,
            cart: Cart::new(currency),
            allocations: Allocations::new(currency),
            active: ActiveMethods::default(),
            submitting: false,
            on_sale_success: None,
        }
    }

    /// Call `callback` with every sale the backend acknowledges.
    #[must_use]
    pub fn with_on_sale_success(
        mut self,
        callback: impl FnMut(&SaleRecord) + Send + 'static,
    ) -> Self {
        self.on_sale_success = Some(Box::new(callback));
        self
    }

    /// Fetch the active payment methods and reconcile the split against them.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails or the cart total cannot be calculated.
    #[tracing::instrument(name = "checkout.refresh_methods", skip(self), err)]
    pub async fn refresh_methods(&mut self) -> Result<ReconcileOutcome, SessionError> {
        let listed = self.context.payment_methods.list_active().await?;

        Ok(self.set_active_methods(ActiveMethods::new(listed))?)
    }

    /// Replace the active payment method snapshot and reconcile.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart total cannot be calculated.
    pub fn set_active_methods(
        &mut self,
        active: ActiveMethods,
    ) -> Result<ReconcileOutcome, AllocationError> {
        self.active = active;
        self.reconcile()
    }

    /// Look up a product remotely and add one unit of it.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails, the product is inactive, out of
    /// stock or priced in another currency.
    #[tracing::instrument(
        name = "checkout.add_product",
        skip(self),
        fields(product_id = %product),
        err
    )]
    pub async fn add_product(&mut self, product: ProductId) -> Result<u32, SessionError> {
        let record = self.context.products.get_product(product).await?;

        if !record.is_active {
            return Err(SessionError::InactiveProduct(product));
        }

        let product = record.into_product(self.cart.currency())?;

        self.add(product)
    }

    /// Add one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the product cannot be added.
    pub fn add(&mut self, product: Product) -> Result<u32, SessionError> {
        let quantity = self.cart.add(product)?;

        self.reconcile()?;

        Ok(quantity)
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn increment(&mut self, product: ProductId) -> Result<u32, SessionError> {
        let quantity = self.cart.increment(product)?;

        self.reconcile()?;

        Ok(quantity)
    }

    /// Take one unit off a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn decrement(&mut self, product: ProductId) -> Result<u32, SessionError> {
        let quantity = self.cart.decrement(product)?;

        self.reconcile()?;

        Ok(quantity)
    }

    /// Set a line's quantity, clamped to the stock.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn set_quantity(&mut self, product: ProductId, quantity: u32) -> Result<u32, SessionError> {
        let quantity = self.cart.set_quantity(product, quantity)?;

        self.reconcile()?;

        Ok(quantity)
    }

    /// Set a line's quantity from typed text; blank or garbled text changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn set_quantity_input(
        &mut self,
        product: ProductId,
        input: &str,
    ) -> Result<Option<u32>, SessionError> {
        let quantity = self.cart.set_quantity_input(product, input)?;

        self.reconcile()?;

        Ok(quantity)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the cart.
    pub fn remove_line(&mut self, product: ProductId) -> Result<(), SessionError> {
        self.cart.remove(product)?;
        self.reconcile()?;

        Ok(())
    }

    /// Append an allocation for the next unused active method.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart total cannot be calculated.
    pub fn add_allocation(&mut self) -> Result<Option<usize>, SessionError> {
        let index = self.allocations.add(&self.active);

        self.reconcile()?;

        Ok(index)
    }

    /// Delete the allocation at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no allocation at `index`.
    pub fn remove_allocation(&mut self, index: usize) -> Result<PaymentAllocation, SessionError> {
        let removed = self.allocations.remove(index)?;

        self.reconcile()?;

        Ok(removed)
    }

    /// Switch the allocation at `index` to another active, unused method.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or the method is inactive or taken.
    pub fn update_method(
        &mut self,
        index: usize,
        method: PaymentMethodId,
    ) -> Result<(), SessionError> {
        self.allocations.update_method(index, method, &self.active)?;
        self.reconcile()?;

        Ok(())
    }

    /// Set the amount of the allocation at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or the amount is out of range.
    pub fn update_amount(&mut self, index: usize, amount: Decimal) -> Result<(), SessionError> {
        self.allocations.update_amount(index, amount)?;
        self.reconcile()?;

        Ok(())
    }

    /// Top up the allocation at `index` with whatever is still owed.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not exist or the totals overflow.
    pub fn fill_remaining(&mut self, index: usize) -> Result<bool, SessionError> {
        let total = self.cart.total()?;
        let filled = self.allocations.fill_remaining(index, &total)?;

        self.reconcile()?;

        Ok(filled)
    }

    /// Methods the allocation at `index` may switch to.
    pub fn candidates(&self, index: usize) -> Vec<&PaymentMethod> {
        self.allocations.candidates(index, &self.active)
    }

    /// Current totals.
    ///
    /// # Errors
    ///
    /// Returns an error if a total overflows.
    pub fn summary(&self) -> Result<CheckoutSummary, TotalPriceError> {
        compute_checkout_summary(&self.cart, &self.allocations)
    }

    /// Where the session is in its lifecycle.
    pub fn phase(&self) -> CheckoutPhase {
        CheckoutPhase::of(&self.allocations, self.submitting)
    }

    /// Validate the checkout, build the sale request and mark the session as submitting.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::AlreadySubmitting`]: a request is already in flight.
    /// - [`SubmitError::Invalid`]: the first failing validation check.
    pub fn begin_submit(&mut self, receipt_issued: bool) -> Result<SaleRequest, SubmitError> {
        if self.submitting {
            return Err(SubmitError::AlreadySubmitting);
        }

        let request = prepare_sale(&self.cart, &self.allocations, &self.active)?
            .with_receipt_issued(receipt_issued);

        self.submitting = true;

        Ok(request)
    }

    /// Apply the backend's answer to a submission started with [`Self::begin_submit`].
    ///
    /// On success the cart and split are cleared and the sale callback runs;
    /// on failure everything is left as it was.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Unauthorized`]: the token was refused.
    /// - [`SubmitError::Rejected`]: any other failure, with the backend's message if it sent one.
    pub fn finish_submit(
        &mut self,
        outcome: Result<SaleRecord, ClientError>,
    ) -> Result<SaleRecord, SubmitError> {
        self.submitting = false;

        match outcome {
            Ok(sale) => {
                self.cart.clear();
                self.allocations.reset();

                info!(sale_id = sale.id, total = %sale.total_amount, "sale recorded");

                if let Some(callback) = self.on_sale_success.as_mut() {
                    callback(&sale);
                }

                Ok(sale)
            }
            Err(ClientError::Unauthorized) => {
                warn!("sale refused: unauthorized");

                Err(SubmitError::Unauthorized)
            }
            Err(error) => {
                let message = error
                    .backend_message()
                    .unwrap_or(SALE_FAILED_FALLBACK)
                    .to_string();

                warn!(%error, "sale was not recorded");

                Err(SubmitError::Rejected {
                    message,
                    source: error,
                })
            }
        }
    }

    /// Validate and send the sale, then apply the answer.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_submit`] and [`Self::finish_submit`].
    #[tracing::instrument(name = "checkout.submit", skip(self), err)]
    pub async fn submit(&mut self, receipt_issued: bool) -> Result<SaleRecord, SubmitError> {
        let request = self.begin_submit(receipt_issued)?;
        let in_flight = InFlight { session: self };
        let outcome = in_flight.session.context.sales.create_sale(request).await;

        in_flight.session.finish_submit(outcome)
    }

    /// Give up on a submission whose answer will never be applied.
    ///
    /// Cart and split are kept as they were. The backend may still have
    /// recorded the sale. Returns whether a submission was in flight.
    pub fn abort_submit(&mut self) -> bool {
        if !self.submitting {
            return false;
        }

        self.submitting = false;

        warn!("sale submission abandoned before the backend answered");

        true
    }

    /// The cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The payment split.
    pub fn allocations(&self) -> &Allocations {
        &self.allocations
    }

    /// The active payment method snapshot.
    pub fn active_methods(&self) -> &ActiveMethods {
        &self.active
    }

    /// Whether a sale request is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn reconcile(&mut self) -> Result<ReconcileOutcome, AllocationError> {
        let outcome = self.allocations.reconcile(&self.cart, &self.active)?;

        if outcome.pruned > 0 {
            warn!(
                pruned = outcome.pruned,
                "dropped allocations for deactivated payment methods"
            );
        }

        if outcome.seeded {
            debug!("seeded payment allocation with the cart total");
        }

        Ok(outcome)
    }
}

/// Abandons the submission if dropped before the answer was applied.
struct InFlight<'a> {
    session: &'a mut CheckoutSession,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.session.abort_submit();
    }
}

impl Debug for CheckoutSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("cart", &self.cart)
            .field("allocations", &self.allocations)
            .field("active", &self.active)
            .field("submitting", &self.submitting)
            .finish_non_exhaustive()
    }
}
