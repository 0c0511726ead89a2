//! Arithmetic over the Mersenne prime field of order `2^31 - 1`.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{FieldElement, FieldError};

/// The Mersenne prime `2^31 - 1`.
pub const P: u32 = (1 << 31) - 1;

/// A fully reduced element of the Mersenne31 field.
///
/// The stored value is always in `[0, P)`; every operation preserves the
/// invariant.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct M31(u32);

impl M31 {
    /// The additive identity.
    pub const ZERO: Self = Self(0);

    /// The multiplicative identity.
    pub const ONE: Self = Self(1);

    /// Wraps a value already known to be in `[0, P)`.
    pub const fn from_u32_unchecked(value: u32) -> Self {
        Self(value)
    }

    /// Reduces a value in `[0, 2P)` to the canonical range.
    pub fn partial_reduce(value: u32) -> Self {
        debug_assert!(value < 2 * P);
        Self(if value >= P { value - P } else { value })
    }

    /// Reduces a value in `[0, P^2)` with the folded-shift identity.
    pub fn reduce(value: u64) -> Self {
        let first_shift = (value >> 31) + value + 1;
        let second_shift = (first_shift >> 31) + value;
        Self((second_shift & P as u64) as u32)
    }

    /// Returns the canonical representative.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether this is the additive identity.
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Squares the element.
    pub fn square(self) -> Self {
        self * self
    }

    /// Raises the element to `2^n` by repeated squaring.
    fn sqn(self, n: u32) -> Self {
        let mut out = self;
        for _ in 0..n {
            out = out.square();
        }
        out
    }

    /// Exponentiation by squaring.
    pub fn pow(self, mut exponent: u64) -> Self {
        let mut base = self;
        let mut out = Self::ONE;
        while exponent > 0 {
            if exponent & 1 == 1 {
                out *= base;
            }
            base = base.square();
            exponent >>= 1;
        }
        out
    }

    /// Multiplicative inverse, computed as `self^(P - 2)` through a fixed
    /// addition chain.
    pub fn inverse(self) -> Result<Self, FieldError> {
        if self.is_zero() {
            return Err(FieldError::ZeroInverse);
        }
        // Addition chain for 2147483645 = P - 2.
        let t0 = self.sqn(2) * self; // self^5
        let t1 = t0.sqn(1) * t0; // self^15
        let t2 = t1.sqn(3) * t0; // self^125
        let t3 = t2.sqn(1) * t0; // self^255
        let t4 = t3.sqn(8) * t3; // self^65535
        let t5 = t4.sqn(8) * t3; // self^16777215
        Ok(t5.sqn(7) * t2)
    }
}

impl Add for M31 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::partial_reduce(self.0 + rhs.0)
    }
}

impl AddAssign for M31 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for M31 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::partial_reduce(self.0 + P - rhs.0)
    }
}

impl SubAssign for M31 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for M31 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::reduce(u64::from(self.0) * u64::from(rhs.0))
    }
}

impl MulAssign for M31 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Neg for M31 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::partial_reduce(P - self.0)
    }
}

impl From<u32> for M31 {
    fn from(value: u32) -> Self {
        Self::reduce(u64::from(value))
    }
}

impl From<M31> for u32 {
    fn from(value: M31) -> u32 {
        value.0
    }
}

impl FieldElement for M31 {
    fn zero() -> Self {
        Self::ZERO
    }

    fn one() -> Self {
        Self::ONE
    }

    fn is_zero(&self) -> bool {
        M31::is_zero(*self)
    }

    fn inverse(&self) -> Result<Self, FieldError> {
        M31::inverse(*self)
    }
}

impl fmt::Display for M31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
