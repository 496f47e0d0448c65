//! Value objects for the order domain.

/// Number of packages in an order. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest accepted quantity.
    pub const MIN: i64 = 1;

    /// Largest quantity the store column can hold.
    pub const MAX: i64 = i32::MAX as i64;

    /// Creates a quantity, returning `None` outside `MIN..=MAX`.
    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            u32::try_from(value).ok().map(Self)
        } else {
            None
        }
    }

    /// Returns the quantity as an unsigned count.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// Returns the quantity in the store's column type.
    pub fn as_i32(&self) -> i32 {
        // bounded by MAX at construction
        i32::try_from(self.0).unwrap_or(i32::MAX)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
