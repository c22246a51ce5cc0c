//! Exact rational probabilities.
//!
//! Path probabilities are products of `1/n` weights, so they are always
//! representable as `1 / (n1 * n2 * ... * nk)`. Sums of them are general
//! fractions. Everything is kept as a reduced big-integer ratio so that
//! "the distribution sums to one" is an exact equality, never a tolerance.

use num_bigint::BigUint;
use num_rational::Ratio;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use std::str::FromStr;

/// An exact probability in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Probability(Ratio<BigUint>);

impl Probability {
    /// Probability of an impossible event.
    pub fn zero() -> Self {
        Self(Ratio::zero())
    }
    
    /// Probability of a certain event (the empty path).
    pub fn one() -> Self {
        Self(Ratio::one())
    }
    
    /// Creates `numer / denom`.
    ///
    /// Returns `None` for a zero denominator or a value above one.
    pub fn new(numer: u64, denom: u64) -> Option<Self> {
        if denom == 0 || numer > denom {
            return None;
        }
        Some(Self(Ratio::new(BigUint::from(numer), BigUint::from(denom))))
    }
    
    /// Creates `1 / denom` from a running product of bounds.
    ///
    /// Returns `None` for a zero denominator.
    pub fn reciprocal(denom: &BigUint) -> Option<Self> {
        if denom.is_zero() {
            return None;
        }
        Some(Self(Ratio::new(BigUint::one(), denom.clone())))
    }
    
    /// Returns true if this is exactly one.
    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }
    
    /// Returns true if this is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
    
    /// Reduced numerator.
    pub fn numer(&self) -> &BigUint {
        self.0.numer()
    }
    
    /// Reduced denominator.
    pub fn denom(&self) -> &BigUint {
        self.0.denom()
    }
    
    /// Floating point approximation, for display and tolerance checks only.
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }
}

impl Default for Probability {
    fn default() -> Self {
        Self::zero()
    }
}

impl Add for Probability {
    type Output = Probability;
    
    fn add(self, rhs: Probability) -> Probability {
        Probability(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Probability> for Probability {
    type Output = Probability;
    
    fn add(self, rhs: &'a Probability) -> Probability {
        Probability(self.0 + &rhs.0)
    }
}

impl AddAssign<&Probability> for Probability {
    fn add_assign(&mut self, rhs: &Probability) {
        self.0 = &self.0 + &rhs.0;
    }
}

impl Mul for Probability {
    type Output = Probability;
    
    fn mul(self, rhs: Probability) -> Probability {
        Probability(self.0 * rhs.0)
    }
}

impl Sum for Probability {
    fn sum<I: Iterator<Item = Probability>>(iter: I) -> Self {
        iter.fold(Probability::zero(), |acc, p| acc + p)
    }
}

impl<'a> Sum<&'a Probability> for Probability {
    fn sum<I: Iterator<Item = &'a Probability>>(iter: I) -> Self {
        iter.fold(Probability::zero(), |acc, p| acc + p)
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Probability {
    type Err = String;
    
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ratio = Ratio::<BigUint>::from_str(s.trim())
            .map_err(|e| format!("Invalid probability '{}': {}", s, e))?;
        if ratio > Ratio::one() {
            return Err(format!("Probability {} exceeds 1", s));
        }
        Ok(Self(ratio))
    }
}

impl Serialize for Probability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Probability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
