//! Remote domain services
//!
//! Each resource the checkout needs from the bakery API sits behind an
//! `#[automock]` trait so the session can be driven without a server.

pub mod payment_methods;
pub mod products;
pub mod sales;
