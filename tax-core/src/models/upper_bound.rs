use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Finite stand-in for an unbounded upper edge in tabular storage formats
/// that cannot represent infinity.
pub const UNBOUNDED_SENTINEL: Decimal = dec!(999999999.99);

/// Upper edge of a tax bracket.
///
/// The top bracket of a table is [`UpperBound::Unbounded`] so that every
/// income above the last threshold is still covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum UpperBound {
    Bounded(Decimal),
    Unbounded,
}

impl UpperBound {
    /// Clamps `income` to this edge, i.e. `min(upper, income)`.
    ///
    /// The clamp is inclusive: an income equal to the bound is returned
    /// unchanged.
    pub fn clamp(&self, income: Decimal) -> Decimal {
        match self {
            Self::Bounded(upper) => income.min(*upper),
            Self::Unbounded => income,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    /// The finite value, if any.
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Bounded(upper) => Some(*upper),
            Self::Unbounded => None,
        }
    }

    /// Reads a stored upper edge. Anything at or above [`UNBOUNDED_SENTINEL`]
    /// is treated as unbounded.
    pub fn from_sentinel(value: Decimal) -> Self {
        if value >= UNBOUNDED_SENTINEL {
            Self::Unbounded
        } else {
            Self::Bounded(value)
        }
    }

    /// Writes this edge in a form suitable for storage.
    pub fn to_sentinel(&self) -> Decimal {
        self.value().unwrap_or(UNBOUNDED_SENTINEL)
    }
}

impl From<Option<Decimal>> for UpperBound {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Self::Unbounded, Self::Bounded)
    }
}
