//! App Context

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use thiserror::Error;

use crate::{
    client::{ApiClient, ClientError},
    config::ApiConfig,
    domain::{
        payment_methods::{HttpPaymentMethodsService, PaymentMethodsService},
        products::{HttpProductsService, ProductsService},
        sales::{HttpSalesService, SalesService},
    },
};

/// Errors raised while building the application context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The HTTP client could not be built.
    #[error("failed to build API client")]
    Client(#[source] ClientError),
}

/// Remote services the checkout depends on.
#[derive(Clone)]
pub struct AppContext {
    /// Payment method listing.
    pub payment_methods: Arc<dyn PaymentMethodsService>,

    /// Product lookup.
    pub products: Arc<dyn ProductsService>,

    /// Sale creation.
    pub sales: Arc<dyn SalesService>,
}

impl AppContext {
    /// Build application context talking to the configured bakery API.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self, AppInitError> {
        let client = ApiClient::new(config).map_err(AppInitError::Client)?;

        Ok(Self {
            payment_methods: Arc::new(HttpPaymentMethodsService::new(client.clone())),
            products: Arc::new(HttpProductsService::new(client.clone())),
            sales: Arc::new(HttpSalesService::new(client)),
        })
    }
}

impl Debug for AppContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext").finish_non_exhaustive()
    }
}
