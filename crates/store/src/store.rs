use async_trait::async_trait;

use crate::{
    NewOrderRecord, NewUserRecord, OrderChanges, OrderId, OrderQuery, OrderRecord, OrderSlice,
    Result, UserId, UserRecord,
};

/// Core trait for store implementations.
///
/// A store persists users, their bearer tokens and their orders. It enforces
/// uniqueness of user email and phone number, assigns identifiers and
/// timestamps, and cascades user deletion to owned orders and tokens.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait Store: Send + Sync {
    // -- Users --

    /// Inserts a user.
    ///
    /// Fails with `StoreError::Conflict` naming the offending field when the
    /// email or phone number is already taken.
    async fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord>;

    /// Loads a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>>;

    /// Loads a user by exact email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Deletes a user together with their orders and tokens.
    ///
    /// Returns `false` if the user did not exist.
    async fn delete_user(&self, id: UserId) -> Result<bool>;

    // -- Tokens --

    /// Associates a bearer token with a user.
    async fn insert_token(&self, token: &str, user_id: UserId) -> Result<()>;

    /// Resolves a bearer token to its user.
    async fn get_user_by_token(&self, token: &str) -> Result<Option<UserRecord>>;

    // -- Orders --

    /// Inserts an order, stamping `created_at` and `updated_at`.
    async fn insert_order(&self, order: NewOrderRecord) -> Result<OrderRecord>;

    /// Loads an order by id.
    async fn get_order(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Applies column changes to one order and refreshes `updated_at`.
    ///
    /// Returns `None` if the order does not exist, or if
    /// `changes.expected_status` is set and does not match the stored status.
    async fn update_order(&self, id: OrderId, changes: OrderChanges)
    -> Result<Option<OrderRecord>>;

    /// Deletes an order. Returns `false` if it did not exist.
    async fn delete_order(&self, id: OrderId) -> Result<bool>;

    /// Runs a filtered, ordered, windowed listing.
    async fn query_orders(&self, query: &OrderQuery) -> Result<OrderSlice>;
}
