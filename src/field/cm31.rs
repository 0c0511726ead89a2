//! The quadratic extension `M31[i] / (i^2 + 1)`.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{FieldElement, FieldError, M31};

/// An element `real + imag * i` with `i^2 = -1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CM31 {
    /// Real coordinate.
    pub real: M31,
    /// Imaginary coordinate.
    pub imag: M31,
}

impl CM31 {
    /// The additive identity.
    pub const ZERO: Self = Self::new(M31::ZERO, M31::ZERO);

    /// The multiplicative identity.
    pub const ONE: Self = Self::new(M31::ONE, M31::ZERO);

    /// Builds an element from its coordinates.
    pub const fn new(real: M31, imag: M31) -> Self {
        Self { real, imag }
    }

    /// Builds an element from canonical `u32` coordinates.
    pub const fn from_u32_unchecked(real: u32, imag: u32) -> Self {
        Self::new(M31::from_u32_unchecked(real), M31::from_u32_unchecked(imag))
    }

    /// Whether this is the additive identity.
    pub fn is_zero(self) -> bool {
        self.real.is_zero() && self.imag.is_zero()
    }

    /// Squares the element.
    pub fn square(self) -> Self {
        self * self
    }

    /// Complex conjugate `real - imag * i`.
    pub fn conjugate(self) -> Self {
        Self::new(self.real, -self.imag)
    }

    /// The norm `real^2 + imag^2` as a base-field element.
    pub fn norm_squared(self) -> M31 {
        self.real.square() + self.imag.square()
    }

    /// Multiplicative inverse `conjugate / norm`.
    pub fn inverse(self) -> Result<Self, FieldError> {
        let norm_inverse = self.norm_squared().inverse()?;
        Ok(self.conjugate() * norm_inverse)
    }
}

impl Add for CM31 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.real + rhs.real, self.imag + rhs.imag)
    }
}

impl AddAssign for CM31 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for CM31 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.real - rhs.real, self.imag - rhs.imag)
    }
}

impl SubAssign for CM31 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for CM31 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.real * rhs.real - self.imag * rhs.imag,
            self.real * rhs.imag + self.imag * rhs.real,
        )
    }
}

impl MulAssign for CM31 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Neg for CM31 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.real, -self.imag)
    }
}

impl Sub<M31> for CM31 {
    type Output = Self;

    fn sub(self, rhs: M31) -> Self {
        Self::new(self.real - rhs, self.imag)
    }
}

impl Mul<M31> for CM31 {
    type Output = Self;

    fn mul(self, rhs: M31) -> Self {
        Self::new(self.real * rhs, self.imag * rhs)
    }
}

impl From<M31> for CM31 {
    fn from(value: M31) -> Self {
        Self::new(value, M31::ZERO)
    }
}

impl FieldElement for CM31 {
    fn zero() -> Self {
        Self::ZERO
    }

    fn one() -> Self {
        Self::ONE
    }

    fn is_zero(&self) -> bool {
        CM31::is_zero(*self)
    }

    fn inverse(&self) -> Result<Self, FieldError> {
        CM31::inverse(*self)
    }
}

impl fmt::Display for CM31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}i", self.real, self.imag)
    }
}
