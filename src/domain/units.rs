//! Strongly typed CO2-equivalent quantities.
//!
//! Compliance balances cross the public API in grams, while the banking
//! ledger aggregates in tonnes. Keeping the two as distinct types makes every
//! conversion an explicit call to [`GramsCo2e::to_tonnes`] or
//! [`TonnesCo2e::to_grams`].

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Fixed conversion factor between grams and tonnes.
pub const GRAMS_PER_TONNE: f64 = 1_000_000.0;

/// A signed quantity of CO2-equivalent expressed in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GramsCo2e(pub f64);

/// A signed quantity of CO2-equivalent expressed in tonnes.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TonnesCo2e(pub f64);

macro_rules! impl_quantity {
    ($name:ident) => {
        impl $name {
            pub const ZERO: Self = Self(0.0);

            pub fn new(value: f64) -> Self {
                Self(value)
            }

            pub fn value(self) -> f64 {
                self.0
            }

            pub fn is_positive(self) -> bool {
                self.0 > 0.0
            }

            pub fn is_negative(self) -> bool {
                self.0 < 0.0
            }

            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            pub fn abs(self) -> Self {
                Self(self.0.abs())
            }

            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl Add for $name {
            type Output = Self;

            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;

            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;

            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::ZERO, |acc, value| acc + value)
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                iter.copied().sum()
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_quantity!(GramsCo2e);
impl_quantity!(TonnesCo2e);

impl GramsCo2e {
    pub fn to_tonnes(self) -> TonnesCo2e {
        TonnesCo2e(self.0 / GRAMS_PER_TONNE)
    }
}

impl TonnesCo2e {
    pub fn to_grams(self) -> GramsCo2e {
        GramsCo2e(self.0 * GRAMS_PER_TONNE)
    }
}

impl fmt::Display for GramsCo2e {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} gCO2e", self.0)
    }
}

impl fmt::Display for TonnesCo2e {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6} tCO2e", self.0)
    }
}
