//! Customer model
//!
//! A customer and their measurement profile, in the shape the record store
//! keeps. Every optional field is present as an explicit `null` when absent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CustomerId;

/// Maximum customer name length (characters)
pub const NAME_MAX_LEN: usize = 255;
/// Maximum phone length (characters)
pub const PHONE_MAX_LEN: usize = 20;
/// Maximum length of the short style/preference text fields
pub const STYLE_MAX_LEN: usize = 100;
/// Maximum customer notes length (characters)
pub const NOTES_MAX_LEN: usize = 2000;

/// Body measurements, all optional and independently nullable
///
/// Serialized flattened into the customer object with camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Measurements {
    pub chest: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub shoulder: Option<f64>,
    pub sleeve_length: Option<f64>,
    pub armhole: Option<f64>,
    pub bicep: Option<f64>,
    pub wrist: Option<f64>,
    pub neck: Option<f64>,
    pub shirt_length: Option<f64>,
    pub front_length: Option<f64>,
    pub back_length: Option<f64>,
    pub trouser_length: Option<f64>,
    pub inseam: Option<f64>,
    pub thigh: Option<f64>,
    pub knee: Option<f64>,
    pub calf: Option<f64>,
    pub bottom: Option<f64>,

    pub collar_style: Option<String>,
    pub cuff_style: Option<String>,
    pub fit_preference: Option<String>,
}

impl Measurements {
    /// JSON keys of the numeric measurement fields
    pub const NUMERIC_FIELDS: [&'static str; 18] = [
        "chest",
        "waist",
        "hip",
        "shoulder",
        "sleeveLength",
        "armhole",
        "bicep",
        "wrist",
        "neck",
        "shirtLength",
        "frontLength",
        "backLength",
        "trouserLength",
        "inseam",
        "thigh",
        "knee",
        "calf",
        "bottom",
    ];

    /// JSON keys of the short text fields
    pub const TEXT_FIELDS: [&'static str; 3] = ["collarStyle", "cuffStyle", "fitPreference"];

    /// Mutable access to the short text fields, for normalization
    pub fn text_fields_mut(&mut self) -> [&mut Option<String>; 3] {
        [
            &mut self.collar_style,
            &mut self.cuff_style,
            &mut self.fit_preference,
        ]
    }
}

/// A customer record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Unique identifier
    pub id: CustomerId,

    /// Customer name
    pub name: String,

    /// Contact phone
    pub phone: Option<String>,

    /// Measurement profile
    #[serde(flatten)]
    pub measurements: Measurements,

    /// Free-form notes
    pub notes: Option<String>,

    /// When the customer was created
    pub created_at: DateTime<Utc>,

    /// When the customer was last modified
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Create a new customer with no measurements
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: CustomerId::new(),
            name: name.into(),
            phone: None,
            measurements: Measurements::default(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the customer
    pub fn validate(&self) -> Result<(), CustomerValidationError> {
        if self.name.trim().is_empty() {
            return Err(CustomerValidationError::EmptyName);
        }

        let len = self.name.chars().count();
        if len > NAME_MAX_LEN {
            return Err(CustomerValidationError::NameTooLong(len));
        }

        Ok(())
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Validation errors for customers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CustomerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Customer name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Customer name too long ({} chars, max {})",
                len, NAME_MAX_LEN
            ),
        }
    }
}

impl std::error::Error for CustomerValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_customer() {
        let customer = Customer::new("Ali");
        assert_eq!(customer.name, "Ali");
        assert!(customer.phone.is_none());
        assert_eq!(customer.measurements, Measurements::default());
        assert_eq!(customer.created_at, customer.updated_at);
    }

    #[test]
    fn test_validation() {
        let mut customer = Customer::new("Valid Name");
        assert!(customer.validate().is_ok());

        customer.name = "   ".into();
        assert_eq!(customer.validate(), Err(CustomerValidationError::EmptyName));

        customer.name = "a".repeat(256);
        assert_eq!(
            customer.validate(),
            Err(CustomerValidationError::NameTooLong(256))
        );
    }

    #[test]
    fn test_measurements_flattened_camel_case() {
        let mut customer = Customer::new("Ali");
        customer.measurements.sleeve_length = Some(24.5);
        customer.measurements.collar_style = Some("band".into());

        let value = serde_json::to_value(&customer).unwrap();
        assert_eq!(value["sleeveLength"], 24.5);
        assert_eq!(value["collarStyle"], "band");
        assert!(value["chest"].is_null());
        assert!(value["phone"].is_null());
        assert!(value.get("measurements").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_field_lists_match_serialization() {
        let value = serde_json::to_value(Measurements::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in Measurements::NUMERIC_FIELDS
            .iter()
            .chain(Measurements::TEXT_FIELDS.iter())
        {
            assert!(object.contains_key(*key), "missing {}", key);
        }
        assert_eq!(object.len(), 21);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut customer = Customer::new("Ali");
        customer.measurements.chest = Some(40.0);
        customer.notes = Some("Prefers loose fit".into());

        let json = serde_json::to_string(&customer).unwrap();
        let deserialized: Customer = serde_json::from_str(&json).unwrap();
        assert_eq!(customer, deserialized);
    }
}
