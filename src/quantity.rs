pub mod energy;
pub mod power;

use serde::{Deserialize, Serialize};

/// Numeric value tagged with its physical dimension: `POWER` is the exponent of watts
/// and `TIME` is the exponent of hours.
#[derive(
    Clone,
    Copy,
    Default,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
#[serde(transparent)]
pub struct Quantity<T, const POWER: isize, const TIME: isize>(pub T);

impl<T, const POWER: isize, const TIME: isize> Quantity<T, POWER, TIME>
where
    Self: PartialOrd,
{
    pub fn max(mut self, rhs: Self) -> Self {
        if rhs > self {
            self = rhs;
        }
        self
    }
}

impl<const POWER: isize, const TIME: isize> Quantity<f64, POWER, TIME> {
    pub const ZERO: Self = Self(0.0);

    /// Round half away from zero to the nearest integer.
    #[must_use]
    pub fn round(self) -> Self {
        Self(self.0.round())
    }
}
