//! Validated inputs for order mutations.
//!
//! Each command is built from a decoded request body. Labels are mapped to
//! typed values here; every field is checked and all failures are reported
//! together.

use crate::choices::Choice;
use crate::validation::{Fields, ValidationErrors, char_field, integer_field};

use super::{OrderSize, OrderStatus, Quantity};

const SIZE_MAX_LENGTH: usize = 20;
const QUANTITY_MIN_MESSAGE: &str = "Ensure this value is greater than or equal to 1.";
const QUANTITY_MAX_MESSAGE: &str = "Ensure this value is less than or equal to 2147483647.";

/// Creates an order for the calling user.
///
/// There is no status field: new orders always start as `Pending`, and an
/// `order_status` key in the body is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOrder {
    pub size: OrderSize,
    pub quantity: Quantity,
}

impl CreateOrder {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let size = errors.collect("size", size_field(fields));
        let quantity = errors.collect(
            "quantity",
            quantity_field(fields, "Quantity must be at least 1"),
        );

        match (size, quantity) {
            (Some(size), Some(quantity)) if errors.is_empty() => Ok(Self { size, quantity }),
            _ => Err(errors),
        }
    }
}

/// Staff-only status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

impl UpdateOrderStatus {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match errors.collect("order_status", status_field(fields)) {
            Some(status) => Ok(Self { status }),
            None => Err(errors),
        }
    }
}

/// Replaces size, status and quantity at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOrder {
    pub size: OrderSize,
    pub status: OrderStatus,
    pub quantity: Quantity,
}

impl UpdateOrder {
    pub fn from_fields(fields: &Fields) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let size = errors.collect("size", size_field(fields));
        let status = errors.collect("order_status", status_field(fields));
        let quantity = errors.collect("quantity", quantity_field(fields, QUANTITY_MIN_MESSAGE));

        match (size, status, quantity) {
            (Some(size), Some(status), Some(quantity)) if errors.is_empty() => Ok(Self {
                size,
                status,
                quantity,
            }),
            _ => Err(errors),
        }
    }
}

fn size_field(fields: &Fields) -> Result<OrderSize, String> {
    let label = char_field(fields, "size", Some(SIZE_MAX_LENGTH))?;
    OrderSize::from_label(&label).map_err(|e| e.to_string())
}

fn status_field(fields: &Fields) -> Result<OrderStatus, String> {
    let label = char_field(fields, "order_status", None)?;
    OrderStatus::from_label(&label).map_err(|e| e.to_string())
}

fn quantity_field(fields: &Fields, min_message: &str) -> Result<Quantity, String> {
    let value = integer_field(fields, "quantity")?;
    if value < Quantity::MIN {
        return Err(min_message.to_string());
    }
    Quantity::new(value).ok_or_else(|| QUANTITY_MAX_MESSAGE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_create_maps_labels() {
        let cmd = CreateOrder::from_fields(&fields(json!({
            "size": "extra large",
            "quantity": 3,
        })))
        .unwrap();

        assert_eq!(cmd.size, OrderSize::ExtraLarge);
        assert_eq!(cmd.quantity.get(), 3);
    }

    #[test]
    fn test_create_ignores_order_status() {
        let cmd = CreateOrder::from_fields(&fields(json!({
            "size": "Small",
            "quantity": 1,
            "order_status": "Delivered",
        })))
        .unwrap();

        assert_eq!(cmd.size, OrderSize::Small);
    }

    #[test]
    fn test_create_quantity_messages() {
        let errors = CreateOrder::from_fields(&fields(json!({
            "size": "Small",
            "quantity": 0,
        })))
        .unwrap_err();
        assert_eq!(errors.get("quantity").unwrap(), ["Quantity must be at least 1"]);

        let errors = CreateOrder::from_fields(&fields(json!({
            "size": "Small",
            "quantity": 3_000_000_000i64,
        })))
        .unwrap_err();
        assert_eq!(errors.get("quantity").unwrap(), [QUANTITY_MAX_MESSAGE]);
    }

    #[test]
    fn test_create_reports_every_field() {
        let errors = CreateOrder::from_fields(&fields(json!({"size": "Huge"}))).unwrap_err();

        assert_eq!(
            errors.get("size").unwrap(),
            ["Invalid size 'Huge'. Must be one of: Small, Medium, Large, Extra Large"]
        );
        assert_eq!(errors.get("quantity").unwrap(), ["This field is required."]);
    }

    #[test]
    fn test_size_length_checked_before_label() {
        let errors = CreateOrder::from_fields(&fields(json!({
            "size": "An extremely large parcel",
            "quantity": 1,
        })))
        .unwrap_err();

        assert_eq!(
            errors.get("size").unwrap(),
            ["Ensure this field has no more than 20 characters."]
        );
    }

    #[test]
    fn test_status_update() {
        let cmd = UpdateOrderStatus::from_fields(&fields(json!({"order_status": "in transit"})))
            .unwrap();
        assert_eq!(cmd.status, OrderStatus::InTransit);

        let errors =
            UpdateOrderStatus::from_fields(&fields(json!({"order_status": "Lost"}))).unwrap_err();
        assert_eq!(
            errors.get("order_status").unwrap(),
            ["Invalid status 'Lost'. Must be one of: Pending, In Transit, Delivered"]
        );
    }

    #[test]
    fn test_full_update_requires_all_fields() {
        let errors = UpdateOrder::from_fields(&Fields::new()).unwrap_err();
        for field in ["size", "order_status", "quantity"] {
            assert_eq!(errors.get(field).unwrap(), ["This field is required."]);
        }

        let errors = UpdateOrder::from_fields(&fields(json!({
            "size": "Medium",
            "order_status": "Pending",
            "quantity": -1,
        })))
        .unwrap_err();
        assert_eq!(errors.get("quantity").unwrap(), [QUANTITY_MIN_MESSAGE]);
        assert!(errors.get("size").is_none());
    }
}
