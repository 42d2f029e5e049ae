use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PercentageError {
    #[error("percentage must be between 0 and 100, got {0}")]
    OutOfRange(i64),
}

/// Whole-number completion percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Self = Self(0);
    pub const FULL: Self = Self(100);

    /// # Errors
    ///
    /// Returns `PercentageError::OutOfRange` if `value` is outside `[0, 100]`.
    pub fn new(value: i64) -> Result<Self, PercentageError> {
        match u8::try_from(value) {
            Ok(v) if v <= 100 => Ok(Self(v)),
            _ => Err(PercentageError::OutOfRange(value)),
        }
    }

    /// `round(100 * part / whole)`, zero when `whole` is zero.
    #[must_use]
    pub fn of(part: usize, whole: usize) -> Self {
        if whole == 0 {
            return Self::ZERO;
        }
        let part = part.min(whole);
        // Integer round-half-up; exact for the non-negative inputs we get.
        let scaled = (part * 200 + whole) / (whole * 2);
        Self(u8::try_from(scaled).unwrap_or(100))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl TryFrom<i64> for Percentage {
    type Error = PercentageError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Percentage> for u8 {
    fn from(value: Percentage) -> Self {
        value.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
