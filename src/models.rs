use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub discount_percentage: Option<Decimal>,
    pub discount_quantity_threshold: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    pub name: String,
    pub price: Decimal,
    pub discount_percentage: Option<Decimal>,
    pub discount_quantity_threshold: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct ApplyDiscount {
    pub percentage: Decimal,
    pub quantity_threshold: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub product_id: i64,
    pub product_name: Option<String>,
    pub quantity: i32,
}

/// Request line. Both fields are optional at the wire level so a missing
/// field is reported as a validation failure rather than a parse failure.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItem {
    pub product_id: Option<i64>,
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct CreateOrder {
    pub items: Option<Vec<CreateOrderItem>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithItems {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        OrderWithItems {
            id: order.id,
            created_at: order.created_at,
            items,
        }
    }
}

/// One order line joined with the current state of its product.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub price: Decimal,
    pub discount_percentage: Option<Decimal>,
    pub discount_quantity_threshold: Option<i32>,
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product_name: String,
    pub quantity: i32,
    pub discount_percent: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub products: Vec<InvoiceLine>,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscountedProductReportItem {
    pub product_name: String,
    pub discount_percent: Decimal,
    pub number_of_orders: i32,
    pub total_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub name: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub page_size: i64,
}

impl Paging {
    /// Rows skipped before this page. Saturates instead of wrapping.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }
}
