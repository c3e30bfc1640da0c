//! Products

use rusty_money::{Money, iso::Currency};

use crate::ids::TypedId;

/// Product Id
pub type ProductId = TypedId<Product>;

/// A priced, stocked catalog item that can be sold at the till.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Backend product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Unit sale price
    pub selling_price: Money<'static, Currency>,

    /// Units available to sell
    pub stock_quantity: u32,
}

impl Product {
    /// Create a new product.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        selling_price: Money<'static, Currency>,
        stock_quantity: u32,
    ) -> Self {
        Self {
            id: ProductId::new(id),
            name: name.into(),
            selling_price,
            stock_quantity,
        }
    }

    /// Whether at least one unit can be sold.
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}
