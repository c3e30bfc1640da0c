//! Bakehouse application shell: configuration, logging, the bakery API
//! client, the remote services and the checkout session built on them.

pub mod client;
pub mod config;
pub mod context;
pub mod domain;
pub mod observability;
pub mod session;
pub mod vendors;
