//! Repository module for database CRUD operations
//!
//! PostgreSQL implementations of the store ports.

pub mod order;

pub use order::OrderRepository;
