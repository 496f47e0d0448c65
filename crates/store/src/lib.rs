//! Persistence layer for users, orders and bearer tokens.
//!
//! The [`Store`] trait is implemented by [`InMemoryStore`] (tests and the
//! zero-configuration binary) and [`PostgresStore`].

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod record;
pub mod store;

pub use common::{OrderId, UserId};
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::{OrderQuery, OrderSlice, SearchScope};
pub use record::{NewOrderRecord, NewUserRecord, OrderChanges, OrderRecord, UserRecord};
pub use store::Store;
