//! Snapshot validation
//!
//! The validator is the only gate between untrusted input and the rest of
//! the restore pipeline. It walks an arbitrary JSON value, checks it against
//! the snapshot schema, and either returns a typed [`Snapshot`] or the list of
//! everything that is wrong with it. It never panics on malformed input.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::models::customer::NAME_MAX_LEN;
use crate::models::ids::check_id;
use crate::models::order::ORDER_NUMBER_MAX_LEN;
use crate::models::{Measurements, OrderStatus};

use super::snapshot::{is_supported_version, Snapshot, SUPPORTED_MAJOR_VERSION};

/// Most violations kept in a report; the rest are only counted
pub const MAX_REPORTED_VIOLATIONS: usize = 100;

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location in the document, e.g. `customers[3].name`
    pub path: String,
    /// What is wrong at that location
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Violations found in a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationList {
    violations: Vec<Violation>,
    total: usize,
}

impl ViolationList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation at `path`
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.total += 1;
        if self.violations.len() < MAX_REPORTED_VIOLATIONS {
            self.violations.push(Violation {
                path: path.into(),
                message: message.into(),
            });
        }
    }

    /// Whether no violation was recorded
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Total violations found, including unreported ones
    pub fn total(&self) -> usize {
        self.total
    }

    /// The reported violations
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether some violations were counted but not kept
    pub fn is_truncated(&self) -> bool {
        self.total > self.violations.len()
    }

    /// Whether any reported violation sits at `path`
    pub fn contains_path(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path == path)
    }
}

impl fmt::Display for ViolationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} schema violation(s)", self.total)?;
        for violation in self.violations.iter().take(5) {
            write!(f, "; {}", violation)?;
        }
        if self.total > 5 {
            write!(f, "; ... and {} more", self.total - 5)?;
        }
        Ok(())
    }
}

/// Shape expected of an optional field
#[derive(Debug, Clone, Copy)]
enum FieldKind {
    Text,
    Number,
    Timestamp,
    Date,
}

/// Validate an untrusted JSON document against the snapshot schema
pub fn validate(raw: &Value) -> Result<Snapshot, ViolationList> {
    let mut violations = ViolationList::new();

    let Some(root) = raw.as_object() else {
        violations.push("$", format!("expected an object, found {}", kind_of(raw)));
        return Err(violations);
    };

    match root.get("formatVersion") {
        None => violations.push("formatVersion", "missing required field"),
        Some(Value::String(version)) => {
            if !is_supported_version(version) {
                violations.push(
                    "formatVersion",
                    format!(
                        "unsupported format version '{}' (expected {}.x)",
                        version, SUPPORTED_MAJOR_VERSION
                    ),
                );
            }
        }
        Some(other) => violations.push(
            "formatVersion",
            format!("expected a string, found {}", kind_of(other)),
        ),
    }

    match root.get("createdAt") {
        None => violations.push("createdAt", "missing required field"),
        Some(value) => check_kind(value, FieldKind::Timestamp, "createdAt", &mut violations),
    }

    if let Some(customers) = required_array(root, "customers", &mut violations) {
        let mut seen = HashSet::new();
        for (index, customer) in customers.iter().enumerate() {
            validate_customer(&format!("customers[{}]", index), customer, &mut seen, &mut violations);
        }
    }

    if let Some(orders) = required_array(root, "orders", &mut violations) {
        let mut seen = HashSet::new();
        for (index, order) in orders.iter().enumerate() {
            validate_order(&format!("orders[{}]", index), order, &mut seen, &mut violations);
        }
    }

    if !violations.is_empty() {
        return Err(violations);
    }

    Snapshot::deserialize(raw).map_err(|e| {
        violations.push("$", e.to_string());
        violations
    })
}

fn required_array<'a>(
    root: &'a Map<String, Value>,
    key: &str,
    violations: &mut ViolationList,
) -> Option<&'a Vec<Value>> {
    match root.get(key) {
        None => {
            violations.push(key, "missing required field");
            None
        }
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            violations.push(key, format!("expected an array, found {}", kind_of(other)));
            None
        }
    }
}

fn validate_customer(
    path: &str,
    value: &Value,
    seen: &mut HashSet<String>,
    violations: &mut ViolationList,
) {
    let Some(customer) = value.as_object() else {
        violations.push(path, format!("expected an object, found {}", kind_of(value)));
        return;
    };

    check_id_field(customer, "id", path, Some(("customer", seen)), violations);
    check_required_text(customer, "name", NAME_MAX_LEN, path, violations);

    check_optional(customer, "phone", FieldKind::Text, path, violations);
    check_optional(customer, "notes", FieldKind::Text, path, violations);
    for key in Measurements::NUMERIC_FIELDS {
        check_optional(customer, key, FieldKind::Number, path, violations);
    }
    for key in Measurements::TEXT_FIELDS {
        check_optional(customer, key, FieldKind::Text, path, violations);
    }
    check_optional(customer, "createdAt", FieldKind::Timestamp, path, violations);
    check_optional(customer, "updatedAt", FieldKind::Timestamp, path, violations);
}

fn validate_order(
    path: &str,
    value: &Value,
    seen: &mut HashSet<String>,
    violations: &mut ViolationList,
) {
    let Some(order) = value.as_object() else {
        violations.push(path, format!("expected an object, found {}", kind_of(value)));
        return;
    };

    check_id_field(order, "id", path, Some(("order", seen)), violations);
    check_id_field(order, "customerId", path, None, violations);
    check_required_text(order, "orderNumber", ORDER_NUMBER_MAX_LEN, path, violations);

    match order.get("status") {
        None | Some(Value::Null) => {}
        Some(Value::String(status)) => {
            if status.parse::<OrderStatus>().is_err() {
                let allowed: Vec<_> = OrderStatus::ALL.iter().map(|s| s.as_str()).collect();
                violations.push(
                    field_path(path, "status"),
                    format!("unknown status '{}' (expected one of {})", status, allowed.join(", ")),
                );
            }
        }
        Some(other) => violations.push(
            field_path(path, "status"),
            format!("expected a string, found {}", kind_of(other)),
        ),
    }

    check_optional(order, "price", FieldKind::Number, path, violations);
    check_optional(order, "advancePayment", FieldKind::Number, path, violations);
    check_optional(order, "deliveryDate", FieldKind::Date, path, violations);
    check_optional(order, "description", FieldKind::Text, path, violations);
    check_optional(order, "fabricDetails", FieldKind::Text, path, violations);
    check_optional(order, "createdAt", FieldKind::Timestamp, path, violations);
    check_optional(order, "updatedAt", FieldKind::Timestamp, path, violations);
}

/// Check a required identifier; with `unique`, also reject repeats within the collection
fn check_id_field(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    unique: Option<(&str, &mut HashSet<String>)>,
    violations: &mut ViolationList,
) {
    let path = field_path(path, key);
    match object.get(key) {
        None | Some(Value::Null) => violations.push(path, "missing required field"),
        Some(Value::String(id)) => {
            if let Err(e) = check_id(id) {
                violations.push(path, e.to_string());
            } else if let Some((entity, seen)) = unique {
                if !seen.insert(id.clone()) {
                    violations.push(path, format!("duplicate {} id '{}'", entity, id));
                }
            }
        }
        Some(other) => violations.push(path, format!("expected a string, found {}", kind_of(other))),
    }
}

/// Check a required, non-blank string whose trimmed length is capped
fn check_required_text(
    object: &Map<String, Value>,
    key: &str,
    max_len: usize,
    path: &str,
    violations: &mut ViolationList,
) {
    let path = field_path(path, key);
    match object.get(key) {
        None | Some(Value::Null) => violations.push(path, "missing required field"),
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            let len = trimmed.chars().count();
            if len == 0 {
                violations.push(path, "must not be empty");
            } else if len > max_len {
                violations.push(path, format!("too long ({} chars, max {})", len, max_len));
            }
        }
        Some(other) => violations.push(path, format!("expected a string, found {}", kind_of(other))),
    }
}

/// Check an optional field: absent and `null` are both accepted
fn check_optional(
    object: &Map<String, Value>,
    key: &str,
    kind: FieldKind,
    path: &str,
    violations: &mut ViolationList,
) {
    match object.get(key) {
        None | Some(Value::Null) => {}
        Some(value) => check_kind(value, kind, &field_path(path, key), violations),
    }
}

fn check_kind(value: &Value, kind: FieldKind, path: &str, violations: &mut ViolationList) {
    match (kind, value) {
        (FieldKind::Number, Value::Number(_)) | (FieldKind::Text, Value::String(_)) => {}
        (FieldKind::Timestamp, Value::String(s)) => {
            if DateTime::parse_from_rfc3339(s).is_err() {
                violations.push(path, format!("invalid ISO-8601 timestamp '{}'", truncate_for_report(s)));
            }
        }
        (FieldKind::Date, Value::String(s)) => {
            if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                violations.push(path, format!("invalid date '{}' (expected YYYY-MM-DD)", truncate_for_report(s)));
            }
        }
        (FieldKind::Number, other) => {
            violations.push(path, format!("expected a number, found {}", kind_of(other)))
        }
        (_, other) => violations.push(path, format!("expected a string, found {}", kind_of(other))),
    }
}

fn field_path(parent: &str, key: &str) -> String {
    format!("{}.{}", parent, key)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Keep echoed input short in reports
fn truncate_for_report(s: &str) -> String {
    const MAX: usize = 40;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
