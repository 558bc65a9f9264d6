//! Snapshot sanitization
//!
//! Turns a validated, integrity-checked snapshot into the exact records the
//! store will receive. Sanitization is total: strings are trimmed and
//! truncated to their caps rather than rejected, blank optional text becomes
//! an explicit `None`, missing timestamps take the sanitize-time clock, and a
//! missing order status becomes `pending`.

use chrono::{DateTime, Utc};

use crate::models::customer::{NAME_MAX_LEN, NOTES_MAX_LEN, PHONE_MAX_LEN, STYLE_MAX_LEN};
use crate::models::order::{DESCRIPTION_MAX_LEN, FABRIC_DETAILS_MAX_LEN, ORDER_NUMBER_MAX_LEN};
use crate::models::{Customer, Order};

use super::snapshot::{CustomerRecord, OrderRecord, Snapshot};

/// Records ready for insertion, in snapshot order
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedRecords {
    pub customers: Vec<Customer>,
    pub orders: Vec<Order>,
}

impl SanitizedRecords {
    /// Wrap the records back into a snapshot document
    pub fn into_snapshot(self, format_version: String, created_at: DateTime<Utc>) -> Snapshot {
        Snapshot {
            format_version,
            created_at,
            customers: self.customers.into_iter().map(CustomerRecord::from).collect(),
            orders: self.orders.into_iter().map(OrderRecord::from).collect(),
        }
    }
}

/// Sanitize a snapshot, defaulting missing timestamps to now
pub fn sanitize(snapshot: Snapshot) -> SanitizedRecords {
    sanitize_at(snapshot, Utc::now())
}

/// Sanitize a snapshot, defaulting missing timestamps to `now`
pub fn sanitize_at(snapshot: Snapshot, now: DateTime<Utc>) -> SanitizedRecords {
    SanitizedRecords {
        customers: snapshot
            .customers
            .into_iter()
            .map(|record| sanitize_customer(record, now))
            .collect(),
        orders: snapshot
            .orders
            .into_iter()
            .map(|record| sanitize_order(record, now))
            .collect(),
    }
}

fn sanitize_customer(record: CustomerRecord, now: DateTime<Utc>) -> Customer {
    let mut measurements = record.measurements;
    for field in measurements.text_fields_mut() {
        *field = clean_optional(field.take(), STYLE_MAX_LEN);
    }

    Customer {
        id: record.id,
        name: clean_text(&record.name, NAME_MAX_LEN),
        phone: clean_optional(record.phone, PHONE_MAX_LEN),
        measurements,
        notes: clean_optional(record.notes, NOTES_MAX_LEN),
        created_at: default_timestamp(record.created_at, now),
        updated_at: default_timestamp(record.updated_at, now),
    }
}

fn sanitize_order(record: OrderRecord, now: DateTime<Utc>) -> Order {
    Order {
        id: record.id,
        customer_id: record.customer_id,
        order_number: clean_text(&record.order_number, ORDER_NUMBER_MAX_LEN),
        status: record.status.unwrap_or_default(),
        price: record.price,
        advance_payment: record.advance_payment,
        delivery_date: record.delivery_date,
        description: clean_optional(record.description, DESCRIPTION_MAX_LEN),
        fabric_details: clean_optional(record.fabric_details, FABRIC_DETAILS_MAX_LEN),
        created_at: default_timestamp(record.created_at, now),
        updated_at: default_timestamp(record.updated_at, now),
    }
}

/// The one place absent timestamps are filled in
pub fn default_timestamp(value: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    value.unwrap_or(now)
}

/// Trim, then cut to at most `max_chars` characters
///
/// Trailing whitespace exposed by the cut is trimmed as well, so cleaning
/// an already clean string is a no-op.
pub fn clean_text(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Clean optional text; blank values become `None`
pub fn clean_optional(text: Option<String>, max_chars: usize) -> Option<String> {
    text.map(|t| clean_text(&t, max_chars))
        .filter(|t| !t.is_empty())
}
