//! Domain model for customers and their phone numbers.
//!
//! # Responsibility
//! - Define the records read from and written to the customer store.
//!
//! # Invariants
//! - Identifiers are assigned by the store, never by callers.
//! - A phone always belongs to exactly one customer.

pub mod customer;
