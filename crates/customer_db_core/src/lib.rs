//! Data-access layer for the customer database.
//! Owns the customer/phone schema and every statement run against it.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::{ConfigError, LogConfig, StoreConfig};
pub use logging::{default_log_level, init_logging};
pub use model::customer::{Customer, CustomerId, CustomerMatch, Phone, PhoneId};
pub use repo::customer_repo::{
    ConstraintKind, CustomerMatches, CustomerRepository, SqliteCustomerRepository, StoreError,
    StoreResult,
};

