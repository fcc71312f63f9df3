//! Orders, order line-items and the read-only product catalog.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{CustomerId, OrderId, OrderLineId, ProductId};
use super::validation::ValidationReport;

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum OrderStatus {
    /// Received but not yet worked on.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed received by the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

/// Error returned when parsing an unknown status literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be Pending, Processing, Shipped, Delivered or Cancelled")]
pub struct OrderStatusParseError;

impl OrderStatus {
    /// Stable string form used in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderStatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Processing" => Ok(Self::Processing),
            "Shipped" => Ok(Self::Shipped),
            "Delivered" => Ok(Self::Delivered),
            "Cancelled" => Ok(Self::Cancelled),
            _ => Err(OrderStatusParseError),
        }
    }
}

/// A persisted order. Owns zero-or-more [`OrderLine`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    /// Stable identifier.
    pub id: OrderId,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
    /// The customer who placed it.
    pub customer_id: CustomerId,
    /// Fulfilment status.
    pub status: OrderStatus,
    /// Total amount, non-negative.
    pub total_amount: Decimal,
}

/// A persisted order line-item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    /// Stable identifier.
    pub id: OrderLineId,
    /// The owning order.
    pub order_id: OrderId,
    /// The product sold.
    pub product_id: ProductId,
    /// Units sold, at least one.
    pub quantity: i32,
    /// Price per unit, non-negative.
    pub unit_price: Decimal,
}

/// A catalog product, referenced by order lines. Managed elsewhere; exposed
/// read-only for line-item selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Stable identifier.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Listed price.
    pub price: Decimal,
}

/// Incoming payload for creating or editing an order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// When the order was placed; `None` when the field was missing.
    pub order_date: Option<DateTime<Utc>>,
    /// The customer reference; `None` when the field was missing.
    pub customer_id: Option<CustomerId>,
    /// Status literal.
    pub status: String,
    /// Total amount; `None` when the field was missing.
    pub total_amount: Option<Decimal>,
}

/// Incoming payload for creating or editing an order line.
#[derive(Debug, Clone)]
pub struct OrderLineDraft {
    /// The owning order; `None` when the field was missing.
    pub order_id: Option<OrderId>,
    /// The product sold; `None` when the field was missing.
    pub product_id: Option<ProductId>,
    /// Units sold.
    pub quantity: Option<i32>,
    /// Price per unit.
    pub unit_price: Option<Decimal>,
}

/// Validate an order draft.
pub fn validate_order_draft(draft: &OrderDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    if draft.order_date.is_none() {
        report.add("orderDate", "Order date is required.");
    }
    if draft.customer_id.is_none() {
        report.add("customerId", "Customer is required.");
    }
    if draft.status.parse::<OrderStatus>().is_err() {
        report.add(
            "status",
            "Status must be Pending, Processing, Shipped, Delivered or Cancelled.",
        );
    }
    match draft.total_amount {
        None => report.add("totalAmount", "Total amount is required."),
        Some(total) if total < Decimal::ZERO => {
            report.add("totalAmount", "Total amount cannot be negative.");
        }
        Some(_) => {}
    }
    report
}

/// Validate an order line draft.
pub fn validate_order_line_draft(draft: &OrderLineDraft) -> ValidationReport {
    let mut report = ValidationReport::new();
    if draft.order_id.is_none() {
        report.add("orderId", "Order is required.");
    }
    if draft.product_id.is_none() {
        report.add("productId", "Product is required.");
    }
    match draft.quantity {
        None => report.add("quantity", "Quantity is required."),
        Some(quantity) if quantity < 1 => report.add("quantity", "Quantity must be at least 1."),
        Some(_) => {}
    }
    match draft.unit_price {
        None => report.add("unitPrice", "Unit price is required."),
        Some(price) if price < Decimal::ZERO => {
            report.add("unitPrice", "Unit price cannot be negative.");
        }
        Some(_) => {}
    }
    report
}
