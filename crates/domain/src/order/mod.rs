//! Orders: the entity, its enumerated fields, commands and the service.

mod aggregate;
mod commands;
mod filters;
mod service;
mod size;
mod state;
mod value_objects;

pub use aggregate::Order;
pub use commands::{CreateOrder, UpdateOrder, UpdateOrderStatus};
pub use filters::OrderFilters;
pub use service::OrderService;
pub use size::OrderSize;
pub use state::OrderStatus;
pub use value_objects::Quantity;
