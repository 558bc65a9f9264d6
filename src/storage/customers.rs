//! Customer repository for JSON storage
//!
//! Manages loading and saving customers to customers.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TailorError;
use crate::models::{Customer, CustomerId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable customer data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct CustomerData {
    customers: Vec<Customer>,
}

/// Repository for customer persistence
pub struct CustomerRepository {
    path: PathBuf,
    data: RwLock<HashMap<CustomerId, Customer>>,
}

impl CustomerRepository {
    /// Create a new customer repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load customers from disk
    pub fn load(&self) -> Result<(), TailorError> {
        let file_data: CustomerData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for customer in file_data.customers {
            data.insert(customer.id.clone(), customer);
        }

        Ok(())
    }

    /// Save customers to disk
    pub fn save(&self) -> Result<(), TailorError> {
        let file_data = CustomerData {
            customers: self.get_all()?,
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Check whether a customer exists
    pub fn contains(&self, id: &CustomerId) -> Result<bool, TailorError> {
        let data = self
            .data
            .read()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(data.contains_key(id))
    }

    /// Get all customers, sorted by name then id
    pub fn get_all(&self) -> Result<Vec<Customer>, TailorError> {
        let data = self
            .data
            .read()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut customers: Vec<_> = data.values().cloned().collect();
        customers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(customers)
    }

    /// Insert a new customer; an existing id is a duplicate
    pub fn insert(&self, customer: Customer) -> Result<(), TailorError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if data.contains_key(&customer.id) {
            return Err(TailorError::Duplicate {
                entity_type: "Customer",
                identifier: customer.id.to_string(),
            });
        }

        data.insert(customer.id.clone(), customer);
        Ok(())
    }

    /// Remove a customer, returning it if it was present
    pub fn remove(&self, id: &CustomerId) -> Result<Option<Customer>, TailorError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(id))
    }
}
