//! Domain layer for the order management service.
//!
//! This crate provides:
//! - the `Choice` mapping between client labels and stored codes
//! - field validation for request bodies
//! - the authorization and throttle-scope decision table
//! - order and account services over a `store::Store`

pub mod choices;
pub mod error;
pub mod order;
pub mod pagination;
pub mod policy;
pub mod user;
pub mod validation;

pub use choices::{Choice, InvalidChoice};
pub use error::DomainError;
pub use order::{
    CreateOrder, Order, OrderFilters, OrderService, OrderSize, OrderStatus, Quantity, UpdateOrder,
    UpdateOrderStatus,
};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageRequest};
pub use policy::{Caller, Denial, ForeignUserPolicy, Operation, ThrottleScope};
pub use user::{AccountService, Login, NewUser, User};
pub use validation::ValidationErrors;
