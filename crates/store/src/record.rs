//! Row shapes exchanged with the store.
//!
//! Enumerated columns travel as their stored codes (`"EXTRA_LARGE"`,
//! `"IN_TRANSIT"`); the domain layer owns the mapping to typed values.

use chrono::{DateTime, Utc};

use crate::{OrderId, UserId};

/// A persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub phone_number: String,
    /// Argon2 PHC string; never the plaintext secret.
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// A user ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub email: String,
    pub username: String,
    pub phone_number: String,
    pub password_hash: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub customer_id: UserId,
    pub size: String,
    pub order_status: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order ready to be inserted. Timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderRecord {
    pub customer_id: UserId,
    pub size: String,
    pub order_status: String,
    pub quantity: i32,
}

/// Column changes for an order update. `None` leaves the column untouched.
///
/// Every applied update refreshes `updated_at`, even when all fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderChanges {
    pub size: Option<String>,
    pub order_status: Option<String>,
    pub quantity: Option<i32>,
    /// When set, the update applies only while the stored status equals
    /// this code.
    pub expected_status: Option<String>,
}

impl OrderChanges {
    /// Changes only the status column.
    pub fn status(order_status: impl Into<String>) -> Self {
        Self {
            order_status: Some(order_status.into()),
            ..Default::default()
        }
    }
}
