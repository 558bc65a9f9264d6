//! Storage layer for tailor-backup
//!
//! The backup subsystem talks to records only through the [`RecordStore`]
//! trait: list, create, and delete per entity type, with no bulk or
//! transactional variants. [`Storage`] is the local implementation, backed by
//! JSON files written atomically after every mutation. A mutation whose file
//! write fails is undone in memory, so memory never runs ahead of disk.

pub mod customers;
pub mod file_io;
pub mod orders;

pub use customers::CustomerRepository;
pub use file_io::{read_json, write_bytes_atomic, write_json_atomic};
pub use orders::OrderRepository;

use crate::config::paths::TailorPaths;
use crate::error::{TailorError, TailorResult};
use crate::models::{Customer, CustomerId, Order, OrderId};

/// The authoritative record API consumed by export and restore
pub trait RecordStore {
    /// Every customer presently stored
    fn list_customers(&self) -> TailorResult<Vec<Customer>>;

    /// Store a customer under its own id
    fn create_customer(&self, customer: &Customer) -> TailorResult<CustomerId>;

    /// Remove a customer
    fn delete_customer(&self, id: &CustomerId) -> TailorResult<()>;

    /// Every order presently stored
    fn list_orders(&self) -> TailorResult<Vec<Order>>;

    /// Store an order under its own id
    fn create_order(&self, order: &Order) -> TailorResult<OrderId>;

    /// Remove an order
    fn delete_order(&self, id: &OrderId) -> TailorResult<()>;
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: TailorPaths,
    pub customers: CustomerRepository,
    pub orders: OrderRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: TailorPaths) -> Result<Self, TailorError> {
        paths.ensure_directories()?;

        Ok(Self {
            customers: CustomerRepository::new(paths.customers_file()),
            orders: OrderRepository::new(paths.orders_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &TailorPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), TailorError> {
        self.customers.load()?;
        self.orders.load()?;
        Ok(())
    }
}

impl RecordStore for Storage {
    fn list_customers(&self) -> TailorResult<Vec<Customer>> {
        self.customers.get_all()
    }

    fn create_customer(&self, customer: &Customer) -> TailorResult<CustomerId> {
        customer
            .validate()
            .map_err(|e| TailorError::Validation(e.to_string()))?;

        self.customers.insert(customer.clone())?;
        if let Err(e) = self.customers.save() {
            self.customers.remove(&customer.id)?;
            return Err(e);
        }
        Ok(customer.id.clone())
    }

    fn delete_customer(&self, id: &CustomerId) -> TailorResult<()> {
        let removed = self
            .customers
            .remove(id)?
            .ok_or_else(|| TailorError::customer_not_found(id.as_str()))?;
        if let Err(e) = self.customers.save() {
            self.customers.insert(removed)?;
            return Err(e);
        }
        Ok(())
    }

    fn list_orders(&self) -> TailorResult<Vec<Order>> {
        self.orders.get_all()
    }

    fn create_order(&self, order: &Order) -> TailorResult<OrderId> {
        order
            .validate()
            .map_err(|e| TailorError::Validation(e.to_string()))?;

        if !self.customers.contains(&order.customer_id)? {
            return Err(TailorError::customer_not_found(order.customer_id.as_str()));
        }

        self.orders.insert(order.clone())?;
        if let Err(e) = self.orders.save() {
            self.orders.remove(&order.id)?;
            return Err(e);
        }
        Ok(order.id.clone())
    }

    fn delete_order(&self, id: &OrderId) -> TailorResult<()> {
        let removed = self
            .orders
            .remove(id)?
            .ok_or_else(|| TailorError::order_not_found(id.as_str()))?;
        if let Err(e) = self.orders.save() {
            self.orders.insert(removed)?;
            return Err(e);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TailorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_storage_creation() {
        let (temp_dir, _storage) = create_test_storage();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("backups").exists());
    }

    #[test]
    fn test_create_persists_immediately() {
        let (temp_dir, storage) = create_test_storage();
        let customer = Customer::new("Ali");
        let id = storage.create_customer(&customer).unwrap();
        assert_eq!(id, customer.id);

        let paths = TailorPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut reopened = Storage::new(paths).unwrap();
        reopened.load_all().unwrap();
        assert_eq!(reopened.list_customers().unwrap(), vec![customer]);
    }

    #[test]
    fn test_create_order_requires_customer() {
        let (_temp_dir, storage) = create_test_storage();
        let order = Order::new(CustomerId::parse("ghost").unwrap(), "1");

        let err = storage.create_order(&order).unwrap_err();
        assert!(err.is_not_found());
        assert!(storage.list_orders().unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_invalid_records() {
        let (_temp_dir, storage) = create_test_storage();
        let customer = Customer::new("  ");

        let err = storage.create_customer(&customer).unwrap_err();
        assert!(matches!(err, TailorError::Validation(_)));
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let (_temp_dir, storage) = create_test_storage();
        let err = storage
            .delete_order(&OrderId::parse("nope").unwrap())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    /// Put a directory where a record file belongs so the rename fails
    fn block_file(path: &std::path::Path) {
        if path.exists() {
            std::fs::remove_file(path).unwrap();
        }
        std::fs::create_dir_all(path.join("blocked")).unwrap();
    }

    #[test]
    fn test_failed_create_leaves_memory_unchanged() {
        let (_temp_dir, storage) = create_test_storage();
        block_file(&storage.paths().customers_file());

        assert!(storage.create_customer(&Customer::new("Ali")).is_err());
        assert!(storage.list_customers().unwrap().is_empty());
    }

    #[test]
    fn test_failed_order_create_leaves_memory_unchanged() {
        let (_temp_dir, storage) = create_test_storage();
        let customer = Customer::new("Ali");
        storage.create_customer(&customer).unwrap();
        block_file(&storage.paths().orders_file());

        let order = Order::new(customer.id.clone(), "1");
        assert!(storage.create_order(&order).is_err());
        assert!(storage.list_orders().unwrap().is_empty());
    }

    #[test]
    fn test_failed_delete_keeps_record() {
        let (_temp_dir, storage) = create_test_storage();
        let customer = Customer::new("Ali");
        storage.create_customer(&customer).unwrap();
        let order = Order::new(customer.id.clone(), "1");
        storage.create_order(&order).unwrap();
        block_file(&storage.paths().customers_file());
        block_file(&storage.paths().orders_file());

        assert!(storage.delete_order(&order.id).is_err());
        assert!(storage.delete_customer(&customer.id).is_err());
        assert_eq!(storage.list_orders().unwrap(), vec![order]);
        assert_eq!(storage.list_customers().unwrap(), vec![customer]);
    }

    #[test]
    fn test_full_lifecycle() {
        let (_temp_dir, storage) = create_test_storage();
        let customer = Customer::new("Ali");
        storage.create_customer(&customer).unwrap();
        let order = Order::new(customer.id.clone(), "20240101-001");
        storage.create_order(&order).unwrap();

        assert_eq!(storage.list_orders().unwrap().len(), 1);

        storage.delete_order(&order.id).unwrap();
        storage.delete_customer(&customer.id).unwrap();
        assert!(storage.list_orders().unwrap().is_empty());
        assert!(storage.list_customers().unwrap().is_empty());
    }
}
