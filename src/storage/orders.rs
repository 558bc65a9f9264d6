//! Order repository for JSON storage
//!
//! Manages loading and saving orders to orders.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::TailorError;
use crate::models::{CustomerId, Order, OrderId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable order data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct OrderData {
    orders: Vec<Order>,
}

/// Repository for order persistence
pub struct OrderRepository {
    path: PathBuf,
    data: RwLock<HashMap<OrderId, Order>>,
}

impl OrderRepository {
    /// Create a new order repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Load orders from disk
    pub fn load(&self) -> Result<(), TailorError> {
        let file_data: OrderData = read_json(&self.path)?;

        let mut data = self
            .data
            .write()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        data.clear();
        for order in file_data.orders {
            data.insert(order.id.clone(), order);
        }

        Ok(())
    }

    /// Save orders to disk
    pub fn save(&self) -> Result<(), TailorError> {
        let file_data = OrderData {
            orders: self.get_all()?,
        };

        write_json_atomic(&self.path, &file_data)
    }

    /// Get all orders, sorted by order number then id
    pub fn get_all(&self) -> Result<Vec<Order>, TailorError> {
        let data = self
            .data
            .read()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut orders: Vec<_> = data.values().cloned().collect();
        orders.sort_by(|a, b| {
            a.order_number
                .cmp(&b.order_number)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(orders)
    }

    /// Insert a new order; an existing id is a duplicate
    pub fn insert(&self, order: Order) -> Result<(), TailorError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        if data.contains_key(&order.id) {
            return Err(TailorError::Duplicate {
                entity_type: "Order",
                identifier: order.id.to_string(),
            });
        }

        data.insert(order.id.clone(), order);
        Ok(())
    }

    /// Remove an order, returning it if it was present
    pub fn remove(&self, id: &OrderId) -> Result<Option<Order>, TailorError> {
        let mut data = self
            .data
            .write()
            .map_err(|e| TailorError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        Ok(data.remove(id))
    }
}
