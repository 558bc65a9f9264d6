//! Core data models for tailor-backup
//!
//! Customers with their measurement profiles, and the work orders placed
//! against them.

pub mod customer;
pub mod ids;
pub mod order;

pub use customer::{Customer, CustomerValidationError, Measurements};
pub use ids::{CustomerId, IdError, OrderId};
pub use order::{Order, OrderStatus, OrderValidationError};
