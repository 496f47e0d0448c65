//! Mapping between human-readable enum labels and stored codes.
//!
//! Clients send and receive labels (`"Extra Large"`, `"In Transit"`); the
//! store keeps codes (`"EXTRA_LARGE"`, `"IN_TRANSIT"`). Every enumerated
//! field goes through the same routine, [`parse_label`].

use thiserror::Error;

/// An enumeration with a stored code and a display label per variant.
pub trait Choice: Copy + Eq + Sized + 'static {
    /// Noun used in validation messages, e.g. `"size"`.
    const NOUN: &'static str;

    /// Every variant, in display order.
    const ALL: &'static [Self];

    /// Code persisted by the store.
    fn code(self) -> &'static str;

    /// Label shown to clients.
    fn label(self) -> &'static str;

    /// Resolves a client-supplied label, ignoring case.
    fn from_label(input: &str) -> Result<Self, InvalidChoice> {
        parse_label(input)
    }

    /// Resolves a stored code exactly.
    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.code() == code)
    }
}

/// A label that matched none of the accepted choices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {noun} '{input}'. Must be one of: {}", .accepted.join(", "))]
pub struct InvalidChoice {
    pub noun: &'static str,
    pub input: String,
    pub accepted: Vec<&'static str>,
}

/// Finds the choice whose label equals `input`, case-insensitively.
///
/// Codes are not accepted as input: `"EXTRA_LARGE"` is rejected while
/// `"extra large"` resolves.
pub fn parse_label<C: Choice>(input: &str) -> Result<C, InvalidChoice> {
    let wanted = input.to_lowercase();
    C::ALL
        .iter()
        .copied()
        .find(|choice| choice.label().to_lowercase() == wanted)
        .ok_or_else(|| InvalidChoice {
            noun: C::NOUN,
            input: input.to_string(),
            accepted: C::ALL.iter().map(|choice| choice.label()).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderSize, OrderStatus};

    #[test]
    fn labels_round_trip_case_insensitively() {
        for size in OrderSize::ALL {
            for input in [
                size.label().to_string(),
                size.label().to_lowercase(),
                size.label().to_uppercase(),
            ] {
                let parsed: OrderSize = parse_label(&input).unwrap();
                assert_eq!(parsed, *size);
                assert_eq!(OrderSize::from_code(parsed.code()).unwrap().label(), size.label());
            }
        }
        for status in OrderStatus::ALL {
            let parsed = OrderStatus::from_label(&status.label().to_lowercase()).unwrap();
            assert_eq!(parsed.label(), status.label());
        }
    }

    #[test]
    fn example_inputs_resolve_to_codes() {
        assert_eq!(OrderSize::from_label("small").unwrap().code(), "SMALL");
        assert_eq!(
            OrderSize::from_label("eXtRa LaRgE").unwrap().code(),
            "EXTRA_LARGE"
        );
        assert_eq!(
            OrderStatus::from_label("in transit").unwrap().code(),
            "IN_TRANSIT"
        );
    }

    #[test]
    fn codes_are_not_accepted_as_labels() {
        assert!(OrderSize::from_label("EXTRA_LARGE").is_err());
        assert!(OrderStatus::from_label("IN_TRANSIT").is_err());
    }

    #[test]
    fn rejection_lists_every_size_label() {
        let err = OrderSize::from_label("Huge").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid size 'Huge'. Must be one of: Small, Medium, Large, Extra Large"
        );
        assert_eq!(err.accepted, vec!["Small", "Medium", "Large", "Extra Large"]);
    }

    #[test]
    fn rejection_lists_every_status_label() {
        let err = OrderStatus::from_label("Lost").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid status 'Lost'. Must be one of: Pending, In Transit, Delivered"
        );
    }

    #[test]
    fn unknown_code_resolves_to_none() {
        assert!(OrderSize::from_code("small").is_none());
        assert!(OrderStatus::from_code("CANCELLED").is_none());
    }
}
