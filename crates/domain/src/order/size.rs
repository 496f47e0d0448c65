use crate::choices::Choice;

/// Package size of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderSize {
    #[default]
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl Choice for OrderSize {
    const NOUN: &'static str = "size";
    const ALL: &'static [Self] = &[
        OrderSize::Small,
        OrderSize::Medium,
        OrderSize::Large,
        OrderSize::ExtraLarge,
    ];

    fn code(self) -> &'static str {
        match self {
            OrderSize::Small => "SMALL",
            OrderSize::Medium => "MEDIUM",
            OrderSize::Large => "LARGE",
            OrderSize::ExtraLarge => "EXTRA_LARGE",
        }
    }

    fn label(self) -> &'static str {
        match self {
            OrderSize::Small => "Small",
            OrderSize::Medium => "Medium",
            OrderSize::Large => "Large",
            OrderSize::ExtraLarge => "Extra Large",
        }
    }
}

impl std::fmt::Display for OrderSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
