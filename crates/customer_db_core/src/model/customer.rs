//! Customer, phone and search-row records.
//!
//! # Invariants
//! - `Customer::email` is unique across the store.
//! - Field length limits below are enforced by store `CHECK` constraints.

use serde::{Deserialize, Serialize};

/// Store-assigned customer identifier.
pub type CustomerId = i64;

/// Store-assigned phone identifier.
pub type PhoneId = i64;

pub const FIRST_NAME_MAX_CHARS: usize = 50;
pub const LAST_NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const PHONE_NUMBER_MAX_CHARS: usize = 20;

/// One row of the `customers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// One row of the `phones` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
    pub id: PhoneId,
    pub customer_id: CustomerId,
    pub phone_number: String,
}

/// One row of a customer search.
///
/// A customer with several phones yields one match per phone. A customer
/// without phones yields a single match with `phone_number = None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerMatch {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

impl CustomerMatch {
    /// Full display name, `first last`.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
