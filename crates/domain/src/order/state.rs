//! Order delivery status.

use crate::choices::Choice;

/// The delivery status of an order.
///
/// Staff may move an order between any two statuses; there is no transition
/// graph. The only rule attached to status is the customer edit lock: once
/// an order leaves `Pending`, its owner can no longer change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    /// Created, not yet shipped. The owner may still edit the order.
    #[default]
    Pending,

    /// Shipped and on its way.
    InTransit,

    /// Handed over to the customer.
    Delivered,
}

impl OrderStatus {
    /// Returns true if the owning customer may still edit the order.
    pub fn allows_customer_edits(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

impl Choice for OrderStatus {
    const NOUN: &'static str = "status";
    const ALL: &'static [Self] = &[
        OrderStatus::Pending,
        OrderStatus::InTransit,
        OrderStatus::Delivered,
    ];

    fn code(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::InTransit => "IN_TRANSIT",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::InTransit => "In Transit",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
