//! Repository layer for the customer store.
//!
//! # Responsibility
//! - Define the customer data-access contract.
//! - Keep SQL text and store error decoding inside this boundary.
//!
//! # Invariants
//! - Repositories hold configuration only, never a live connection.
//! - Store failures surface as `StoreError`, never as panics.

pub mod customer_repo;
