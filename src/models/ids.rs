//! Strongly-typed ID wrappers for customers and orders
//!
//! Record ids are opaque strings owned by the record store. Fresh ids are
//! UUID v4 strings, but any well-formed identifier (1-64 characters from
//! `[A-Za-z0-9_-]`) is accepted so that ids survive export/restore cycles
//! unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest accepted identifier
pub const MAX_ID_LEN: usize = 64;

/// Why a string is not a well-formed identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty,
    TooLong(usize),
    InvalidChar(char),
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "identifier cannot be empty"),
            Self::TooLong(len) => {
                write!(f, "identifier too long ({} chars, max {})", len, MAX_ID_LEN)
            }
            Self::InvalidChar(c) => write!(f, "identifier contains invalid character {:?}", c),
        }
    }
}

impl std::error::Error for IdError {}

/// Check that `s` is a well-formed identifier
pub fn check_id(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    let len = s.chars().count();
    if len > MAX_ID_LEN {
        return Err(IdError::TooLong(len));
    }
    if let Some(c) = s
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
    {
        return Err(IdError::InvalidChar(c));
    }
    Ok(())
}

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Parse an ID, rejecting malformed identifiers
            pub fn parse(s: &str) -> Result<Self, IdError> {
                check_id(s)?;
                Ok(Self(s.to_string()))
            }

            /// Get the identifier text
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid.to_string())
            }
        }
    };
}

define_id!(CustomerId);
define_id!(OrderId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_uuid() {
        let id = CustomerId::new();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
        assert!(check_id(id.as_str()).is_ok());
    }

    #[test]
    fn test_short_ids_accepted() {
        assert_eq!(CustomerId::parse("c1").unwrap().as_str(), "c1");
        assert_eq!(OrderId::parse("order_2024-01").unwrap().to_string(), "order_2024-01");
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert_eq!(CustomerId::parse(""), Err(IdError::Empty));
        assert_eq!(CustomerId::parse("a b"), Err(IdError::InvalidChar(' ')));
        assert_eq!(CustomerId::parse("../etc"), Err(IdError::InvalidChar('.')));
        assert_eq!(
            OrderId::parse(&"x".repeat(65)),
            Err(IdError::TooLong(65))
        );
        assert!(OrderId::parse(&"x".repeat(64)).is_ok());
    }

    #[test]
    fn test_id_serialization() {
        let id = OrderId::parse("o1").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"o1\"");
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
