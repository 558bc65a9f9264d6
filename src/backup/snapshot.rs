//! Snapshot document schema
//!
//! A snapshot is a detached copy of every customer and order, stamped with
//! the format version it was written with. Record fields mirror the stored
//! models, except that everything the restore path can default (timestamps,
//! order status) is optional here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Customer, CustomerId, Measurements, Order, OrderId, OrderStatus};

/// Format version written by this build
pub const FORMAT_VERSION: &str = "1.0";

/// Major format version this build can read
pub const SUPPORTED_MAJOR_VERSION: &str = "1";

/// Root backup document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Schema revision the document was written with
    pub format_version: String,

    /// When the snapshot was exported
    pub created_at: DateTime<Utc>,

    pub customers: Vec<CustomerRecord>,

    pub orders: Vec<OrderRecord>,
}

/// Customer as carried in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: CustomerId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(flatten)]
    pub measurements: Measurements,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Order as carried in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub order_number: String,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub advance_payment: Option<f64>,
    #[serde(default)]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fabric_details: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Assemble a snapshot of the given records, stamped with the current format version
    pub fn new(
        created_at: DateTime<Utc>,
        customers: Vec<CustomerRecord>,
        orders: Vec<OrderRecord>,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            created_at,
            customers,
            orders,
        }
    }

    /// Human-readable count summary, used by the share transport
    pub fn summary(&self) -> String {
        format!(
            "Tailor backup: {} customers, {} orders (exported {})",
            self.customers.len(),
            self.orders.len(),
            self.created_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

impl From<Customer> for CustomerRecord {
    fn from(customer: Customer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            phone: customer.phone,
            measurements: customer.measurements,
            notes: customer.notes,
            created_at: Some(customer.created_at),
            updated_at: Some(customer.updated_at),
        }
    }
}

impl From<Order> for OrderRecord {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            customer_id: order.customer_id,
            order_number: order.order_number,
            status: Some(order.status),
            price: order.price,
            advance_payment: order.advance_payment,
            delivery_date: order.delivery_date,
            description: order.description,
            fabric_details: order.fabric_details,
            created_at: Some(order.created_at),
            updated_at: Some(order.updated_at),
        }
    }
}

/// Check whether a `formatVersion` string can be read by this build
pub fn is_supported_version(version: &str) -> bool {
    version.trim().split('.').next() == Some(SUPPORTED_MAJOR_VERSION)
}
