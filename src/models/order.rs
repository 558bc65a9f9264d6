//! Order model
//!
//! A work order tied to exactly one customer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{CustomerId, OrderId};

/// Maximum order number length (characters)
pub const ORDER_NUMBER_MAX_LEN: usize = 50;
/// Maximum order description length (characters)
pub const DESCRIPTION_MAX_LEN: usize = 2000;
/// Maximum fabric details length (characters)
pub const FABRIC_DETAILS_MAX_LEN: usize = 1000;

/// Status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// The wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{}'", s))
    }
}

/// An order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier
    pub id: OrderId,

    /// The customer this order belongs to
    pub customer_id: CustomerId,

    /// Shop-facing order number (e.g. "20240101-001")
    pub order_number: String,

    /// Order status
    pub status: OrderStatus,

    /// Agreed price
    pub price: Option<f64>,

    /// Amount paid up front
    pub advance_payment: Option<f64>,

    /// Promised delivery date
    pub delivery_date: Option<NaiveDate>,

    /// Work description
    pub description: Option<String>,

    /// Fabric details
    pub fabric_details: Option<String>,

    /// When the order was created
    pub created_at: DateTime<Utc>,

    /// When the order was last modified
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new pending order for a customer
    pub fn new(customer_id: CustomerId, order_number: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_id,
            order_number: order_number.into(),
            status: OrderStatus::Pending,
            price: None,
            advance_payment: None,
            delivery_date: None,
            description: None,
            fabric_details: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the order
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.order_number.trim().is_empty() {
            return Err(OrderValidationError::EmptyOrderNumber);
        }

        let len = self.order_number.chars().count();
        if len > ORDER_NUMBER_MAX_LEN {
            return Err(OrderValidationError::OrderNumberTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({})", self.order_number, self.status)
    }
}

/// Validation errors for orders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    EmptyOrderNumber,
    OrderNumberTooLong(usize),
}

impl fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyOrderNumber => write!(f, "Order number cannot be empty"),
            Self::OrderNumberTooLong(len) => write!(
                f,
                "Order number too long ({} chars, max {})",
                len, ORDER_NUMBER_MAX_LEN
            ),
        }
    }
}

impl std::error::Error for OrderValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, OrderStatus::Cancelled);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
        assert!("In_Progress".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_new_order() {
        let customer_id = CustomerId::new();
        let order = Order::new(customer_id.clone(), "20240101-001");
        assert_eq!(order.customer_id, customer_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut order = Order::new(CustomerId::new(), "");
        assert_eq!(order.validate(), Err(OrderValidationError::EmptyOrderNumber));

        order.order_number = "9".repeat(51);
        assert_eq!(
            order.validate(),
            Err(OrderValidationError::OrderNumberTooLong(51))
        );
    }

    #[test]
    fn test_serialization_uses_camel_case_and_nulls() {
        let mut order = Order::new(CustomerId::parse("c1").unwrap(), "A-1");
        order.delivery_date = NaiveDate::from_ymd_opt(2024, 2, 1);

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["customerId"], "c1");
        assert_eq!(value["orderNumber"], "A-1");
        assert_eq!(value["deliveryDate"], "2024-02-01");
        assert_eq!(value["status"], "pending");
        assert!(value["fabricDetails"].is_null());

        let back: Order = serde_json::from_value(value).unwrap();
        assert_eq!(back, order);
    }
}
