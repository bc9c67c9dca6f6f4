// Copyright (c) 2024 Mike Tsao

use crate::prelude::*;
use core::{fmt::Display, ops::Mul};
use serde::{Deserialize, Serialize};

/// [RangedF64] enforces the given range limits while not becoming too expensive
/// to use compared to a plain f64. It clamps at creation and when converting
/// from an f64. Math on the inner value is unchecked, so prefer doing
/// arithmetic on the f64 and wrapping the result.
///
/// [RangedF64] clamps silently.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangedF64<const LOWER: i8, const UPPER: i8>(pub f64);
#[allow(missing_docs)]
impl<const LOWER: i8, const UPPER: i8> RangedF64<LOWER, UPPER> {
    /// The highest valid value.
    pub const MAX: f64 = UPPER as f64;
    /// The lowest valid value.
    pub const MIN: f64 = LOWER as f64;
    /// A zero value.
    pub const ZERO: f64 = 0.0;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
    pub const fn maximum() -> Self {
        Self(Self::MAX)
    }
    pub const fn minimum() -> Self {
        Self(Self::MIN)
    }
    pub const fn zero() -> Self {
        Self(Self::ZERO)
    }
}
impl<const LOWER: i8, const UPPER: i8> Display for RangedF64<LOWER, UPPER> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
impl<const LOWER: i8, const UPPER: i8> From<RangedF64<LOWER, UPPER>> for f64 {
    fn from(value: RangedF64<LOWER, UPPER>) -> Self {
        value.0.clamp(RangedF64::<LOWER, UPPER>::MIN, RangedF64::<LOWER, UPPER>::MAX)
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f64> for RangedF64<LOWER, UPPER> {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

/// A [Normal] is a RangedF64 whose range is [0.0, 1.0]. Envelopes produce
/// these.
pub type Normal = RangedF64<0, 1>;
impl Default for Normal {
    fn default() -> Self {
        Self(1.0)
    }
}
impl From<BipolarNormal> for Normal {
    fn from(value: BipolarNormal) -> Self {
        Self(value.0 * 0.5 + 0.5)
    }
}
impl Mul<Self> for Normal {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

/// A [BipolarNormal] is a RangedF64 whose range is [-1.0, 1.0]. Oscillators
/// produce these.
pub type BipolarNormal = RangedF64<-1, 1>;
impl Default for BipolarNormal {
    fn default() -> Self {
        Self(0.0)
    }
}
impl From<Sample> for BipolarNormal {
    fn from(value: Sample) -> Self {
        Self::new(value.0)
    }
}
impl Mul<Normal> for BipolarNormal {
    type Output = BipolarNormal;

    fn mul(self, rhs: Normal) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}
impl From<Normal> for BipolarNormal {
    fn from(value: Normal) -> Self {
        Self(value.0 * 2.0 - 1.0)
    }
}
