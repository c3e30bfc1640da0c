//! Payment methods service.

use async_trait::async_trait;
use bakehouse::payments::PaymentMethod;
use mockall::automock;
use tracing::info;

use crate::client::{ApiClient, ClientError, ListEnvelope};

/// Payment methods listing path.
const PAYMENT_METHODS_PATH: &str = "/sales/payment-methods/";

/// Payment methods backed by the bakery API.
#[derive(Debug, Clone)]
pub struct HttpPaymentMethodsService {
    client: ApiClient,
}

impl HttpPaymentMethodsService {
    /// Create a service using `client`.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentMethodsService for HttpPaymentMethodsService {
    #[tracing::instrument(name = "payment_methods.list_active", skip(self), err)]
    async fn list_active(&self) -> Result<Vec<PaymentMethod>, ClientError> {
        let methods = self
            .client
            .get_json::<ListEnvelope<PaymentMethod>>(PAYMENT_METHODS_PATH, &[("is_active", "true")])
            .await?
            .into_items();

        info!(count = methods.len(), "listed payment methods");

        Ok(methods)
    }
}

#[automock]
#[async_trait]
pub trait PaymentMethodsService: Send + Sync {
    /// Retrieves the payment methods currently enabled for new sales.
    ///
    /// The listing may still contain inactive entries; callers filter them
    /// through [`bakehouse::payments::ActiveMethods`].
    async fn list_active(&self) -> Result<Vec<PaymentMethod>, ClientError>;
}
