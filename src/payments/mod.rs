//! Payments
//!
//! Payment methods and the allocation of a checkout total across them.

pub mod allocations;
pub mod methods;

pub use allocations::{
    AllocationError, Allocations, PaymentAllocation, ReconcileOutcome, SyncState,
};
pub use methods::{ActiveMethods, PaymentMethod, PaymentMethodId};
