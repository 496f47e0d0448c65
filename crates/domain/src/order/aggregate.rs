//! The order entity.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use store::OrderRecord;

use crate::choices::Choice;
use crate::error::DomainError;

use super::{OrderSize, OrderStatus, Quantity};

/// A delivery order placed by a customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    /// The owning user. Orders are deleted along with their owner.
    pub customer_id: UserId,
    pub size: OrderSize,
    pub status: OrderStatus,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns true if `user` owns this order.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.customer_id == user
    }

    /// Returns true if the owner can no longer edit this order.
    pub fn is_locked_for_customer(&self) -> bool {
        !self.status.allows_customer_edits()
    }
}

impl TryFrom<OrderRecord> for Order {
    type Error = DomainError;

    fn try_from(record: OrderRecord) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| DomainError::DataCorruption {
            entity: "Order",
            reason,
        };

        let size = OrderSize::from_code(&record.size)
            .ok_or_else(|| corrupt(format!("unknown size code '{}'", record.size)))?;
        let status = OrderStatus::from_code(&record.order_status)
            .ok_or_else(|| corrupt(format!("unknown status code '{}'", record.order_status)))?;
        let quantity = Quantity::new(i64::from(record.quantity))
            .ok_or_else(|| corrupt(format!("quantity {} out of range", record.quantity)))?;

        Ok(Self {
            id: record.id,
            customer_id: record.customer_id,
            size,
            status,
            quantity,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(size: &str, status: &str, quantity: i32) -> OrderRecord {
        let now = Utc::now();
        OrderRecord {
            id: OrderId::new(1),
            customer_id: UserId::new(7),
            size: size.to_string(),
            order_status: status.to_string(),
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_record_codes_become_typed_values() {
        let order = Order::try_from(record("EXTRA_LARGE", "IN_TRANSIT", 3)).unwrap();
        assert_eq!(order.size, OrderSize::ExtraLarge);
        assert_eq!(order.status, OrderStatus::InTransit);
        assert_eq!(order.quantity.get(), 3);
        assert!(order.is_owned_by(UserId::new(7)));
        assert!(!order.is_owned_by(UserId::new(8)));
        assert!(order.is_locked_for_customer());
    }

    #[test]
    fn test_unknown_codes_are_corruption() {
        assert!(matches!(
            Order::try_from(record("HUGE", "PENDING", 1)),
            Err(DomainError::DataCorruption { .. })
        ));
        assert!(matches!(
            Order::try_from(record("SMALL", "Pending", 1)),
            Err(DomainError::DataCorruption { .. })
        ));
        assert!(matches!(
            Order::try_from(record("SMALL", "PENDING", 0)),
            Err(DomainError::DataCorruption { .. })
        ));
    }
}
