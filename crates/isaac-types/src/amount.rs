//! Fixed-precision currency amount.
//!
//! `Amount` holds minor units of currency as an unsigned 64-bit integer.
//! Arithmetic never panics or wraps silently: `checked_add`/`checked_sub`
//! return `None` on overflow/underflow, which callers convert to
//! [`TypesError::AmountOverflow`] at the point they need a `Result`.

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::TypesError;

/// Minor units of currency. Comparisons are total; `PartialOrd`/`Ord` derive
/// directly from the wrapped integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Amount(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Checked addition; `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    /// Checked subtraction; `None` on underflow.
    #[must_use]
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Fallible addition, the form most call sites want.
    pub fn add(self, rhs: Amount) -> Result<Amount, TypesError> {
        self.checked_add(rhs).ok_or(TypesError::AmountOverflow)
    }

    /// Fallible subtraction, the form most call sites want.
    pub fn sub(self, rhs: Amount) -> Result<Amount, TypesError> {
        self.checked_sub(rhs).ok_or(TypesError::AmountOverflow)
    }

    /// Sums an iterator of amounts, failing on the first overflow.
    pub fn checked_sum<I: IntoIterator<Item = Amount>>(iter: I) -> Result<Amount, TypesError> {
        iter.into_iter().try_fold(Amount::ZERO, Amount::add)
    }
}

impl Add for Amount {
    type Output = Option<Amount>;
    fn add(self, rhs: Amount) -> Option<Amount> {
        self.checked_add(rhs)
    }
}

impl Sub for Amount {
    type Output = Option<Amount>;
    fn sub(self, rhs: Amount) -> Option<Amount> {
        self.checked_sub(rhs)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(value)
    }
}
