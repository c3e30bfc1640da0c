//! Sales service.

use async_trait::async_trait;
use bakehouse::{checkout::SaleRequest, products::ProductId};
use mockall::automock;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::info;

use crate::client::{ApiClient, ClientError, ItemEnvelope};

/// Sale creation path.
const SALES_PATH: &str = "/sales/sales/";

/// Sale as acknowledged by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaleRecord {
    /// Backend id
    pub id: u64,

    /// Total charged, as computed by the backend
    pub total_amount: Decimal,

    /// Creation timestamp (RFC 3339)
    #[serde(default)]
    pub created_at: String,

    /// Id of the cashier who made the sale
    #[serde(default)]
    pub cashier: Option<u64>,

    /// Username of the cashier who made the sale
    #[serde(default)]
    pub cashier_name: Option<String>,

    /// Whether a paper receipt was issued
    #[serde(default)]
    pub receipt_issued: bool,

    /// Lines sold
    #[serde(default)]
    pub items: Vec<SaleItemRecord>,

    /// Payments taken
    #[serde(default)]
    pub payments: Vec<SalePaymentRecord>,
}

/// One line of an acknowledged sale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SaleItemRecord {
    /// Product sold
    pub product: ProductId,

    /// Product name at the time of sale
    #[serde(default)]
    pub product_name: String,

    /// Units sold
    pub quantity: u32,

    /// Unit price charged
    pub unit_price: Decimal,

    /// `quantity * unit_price`
    pub subtotal: Decimal,
}

/// One payment of an acknowledged sale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SalePaymentRecord {
    /// Payment method name
    #[serde(rename = "method__name")]
    pub method_name: String,

    /// Amount paid
    pub amount: Decimal,
}

/// Sales backed by the bakery API.
#[derive(Debug, Clone)]
pub struct HttpSalesService {
    client: ApiClient,
}

impl HttpSalesService {
    /// Create a service using `client`.
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SalesService for HttpSalesService {
    #[tracing::instrument(
        name = "sales.create",
        skip(self, request),
        fields(
            items = request.items.len(),
            payments = request.payments.len(),
            receipt_issued = request.receipt_issued
        ),
        err
    )]
    async fn create_sale(&self, request: SaleRequest) -> Result<SaleRecord, ClientError> {
        let sale = self
            .client
            .post_json::<_, ItemEnvelope<SaleRecord>>(SALES_PATH, &request)
            .await?
            .into_inner();

        info!(sale_id = sale.id, total = %sale.total_amount, "created sale");

        Ok(sale)
    }
}

#[automock]
#[async_trait]
/// Sale recording operations.
pub trait SalesService: Send + Sync {
    /// Records a sale; the backend decrements stock and books the payments.
    async fn create_sale(&self, request: SaleRequest) -> Result<SaleRecord, ClientError>;
}
