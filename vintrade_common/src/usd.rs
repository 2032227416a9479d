use std::{
    fmt::Display,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{op, Percent};

/// Rounds to two decimal places, with midpoints rounded away from zero.
///
/// Every monetary or percentage value the engine stores passes through this function, so that results are reproducible
/// across runs and backends.
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

//--------------------------------------        Usd         ---------------------------------------------------------
/// An exact decimal amount of US dollars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Usd(Decimal);

op!(binary Usd, Add, add);
op!(binary Usd, Sub, sub);
op!(inplace Usd, AddAssign, add_assign);
op!(inplace Usd, SubAssign, sub_assign);
op!(unary Usd, Neg, neg);

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in USD: {0}")]
pub struct UsdConversionError(String);

impl From<i64> for Usd {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<Decimal> for Usd {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl FromStr for Usd {
    type Err = UsdConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches('$');
        Decimal::from_str(trimmed).map(Self).map_err(|e| UsdConversionError(format!("{s}: {e}")))
    }
}

impl Display for Usd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rounded = round2(self.0);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-${:.2}", rounded.abs())
        } else {
            write!(f, "${:.2}", rounded.abs())
        }
    }
}

impl Usd {
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn round2(self) -> Self {
        Self(round2(self.0))
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Usd) -> Option<Usd> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Usd) -> Option<Usd> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// The price of `quantity` units at `self` each. `None` if the result cannot be represented.
    pub fn checked_mul_quantity(self, quantity: i64) -> Option<Usd> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }

    /// `self` as a percentage of `whole`, rounded with [`round2`]. The percentage is zero if `whole` is not positive,
    /// and `None` if it cannot be represented.
    pub fn checked_percent_of(&self, whole: Usd) -> Option<Percent> {
        if !whole.is_positive() {
            return Some(Percent::zero());
        }
        let ratio = self.0.checked_div(whole.0)?;
        ratio.checked_mul(Decimal::ONE_HUNDRED).map(|p| Percent::from(round2(p)))
    }
}

sqlite_decimal_text!(Usd);
