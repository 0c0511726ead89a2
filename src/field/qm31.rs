//! The degree-4 secure field `CM31[u] / (u^2 - (2 + i))`.

use core::fmt;
use core::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use super::{FieldElement, FieldError, CM31, M31};

/// Number of base-field coordinates in a secure-field element.
pub const SECURE_EXTENSION_DEGREE: usize = 4;

/// The irreducible element `R = 2 + i` with `u^2 = R`.
pub const R: CM31 = CM31::from_u32_unchecked(2, 1);

/// An element `first + second * u` of the secure field.
///
/// Viewed through its four base-field coordinates `(a, b, c, d)` the element
/// reads `a + b*i + c*u + d*i*u`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QM31 {
    /// Coefficient of `1`.
    pub first: CM31,
    /// Coefficient of `u`.
    pub second: CM31,
}

impl QM31 {
    /// The additive identity.
    pub const ZERO: Self = Self::new(CM31::ZERO, CM31::ZERO);

    /// The multiplicative identity.
    pub const ONE: Self = Self::new(CM31::ONE, CM31::ZERO);

    /// Builds an element from its two extension coordinates.
    pub const fn new(first: CM31, second: CM31) -> Self {
        Self { first, second }
    }

    /// Builds an element from canonical `u32` coordinates.
    pub const fn from_u32_unchecked(a: u32, b: u32, c: u32, d: u32) -> Self {
        Self::new(
            CM31::from_u32_unchecked(a, b),
            CM31::from_u32_unchecked(c, d),
        )
    }

    /// Assembles an element from its four base-field coordinates.
    pub const fn from_m31_coords(coords: [M31; 4]) -> Self {
        Self::new(
            CM31::new(coords[0], coords[1]),
            CM31::new(coords[2], coords[3]),
        )
    }

    /// Decomposes the element into its four base-field coordinates.
    pub const fn to_m31_coords(self) -> [M31; 4] {
        [
            self.first.real,
            self.first.imag,
            self.second.real,
            self.second.imag,
        ]
    }

    /// Recomposes an element from the four partial evaluations of its
    /// coordinate polynomials: `e0 + i*e1 + u*e2 + i*u*e3`.
    pub fn from_partial_evals(evals: [Self; 4]) -> Self {
        let mut out = evals[0];
        out += evals[1] * Self::from_u32_unchecked(0, 1, 0, 0);
        out += evals[2] * Self::from_u32_unchecked(0, 0, 1, 0);
        out += evals[3] * Self::from_u32_unchecked(0, 0, 0, 1);
        out
    }

    /// Whether this is the additive identity.
    pub fn is_zero(self) -> bool {
        self.first.is_zero() && self.second.is_zero()
    }

    /// Squares the element.
    pub fn square(self) -> Self {
        self * self
    }

    /// Doubles the element.
    pub fn double(self) -> Self {
        self + self
    }

    /// Exponentiation by squaring.
    pub fn pow(self, mut exponent: u128) -> Self {
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

    /// Conjugate over the quadratic extension of `CM31`: `first - second * u`.
    pub fn complex_conjugate(self) -> Self {
        Self::new(self.first, -self.second)
    }

    /// Multiplicative inverse `(a - b*u) * (a^2 - R*b^2)^-1`.
    pub fn inverse(self) -> Result<Self, FieldError> {
        let denominator = (self.first.square() - R * self.second.square()).inverse()?;
        Ok(self.complex_conjugate() * denominator)
    }
}

impl Add for QM31 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.first + rhs.first, self.second + rhs.second)
    }
}

impl AddAssign for QM31 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for QM31 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.first - rhs.first, self.second - rhs.second)
    }
}

impl SubAssign for QM31 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul for QM31 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        // (a + b*u)(c + d*u) = (a*c + R*b*d) + (a*d + b*c)*u
        Self::new(
            self.first * rhs.first + R * self.second * rhs.second,
            self.first * rhs.second + self.second * rhs.first,
        )
    }
}

impl MulAssign for QM31 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Neg for QM31 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.first, -self.second)
    }
}

impl Mul<M31> for QM31 {
    type Output = Self;

    fn mul(self, rhs: M31) -> Self {
        Self::new(self.first * rhs, self.second * rhs)
    }
}

impl Mul<CM31> for QM31 {
    type Output = Self;

    fn mul(self, rhs: CM31) -> Self {
        Self::new(self.first * rhs, self.second * rhs)
    }
}

impl From<M31> for QM31 {
    fn from(value: M31) -> Self {
        Self::new(CM31::from(value), CM31::ZERO)
    }
}

impl From<CM31> for QM31 {
    fn from(value: CM31) -> Self {
        Self::new(value, CM31::ZERO)
    }
}

impl FieldElement for QM31 {
    fn zero() -> Self {
        Self::ZERO
    }

    fn one() -> Self {
        Self::ONE
    }

    fn is_zero(&self) -> bool {
        QM31::is_zero(*self)
    }

    fn inverse(&self) -> Result<Self, FieldError> {
        QM31::inverse(*self)
    }
}

impl fmt::Display for QM31 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}) + ({})u", self.first, self.second)
    }
}
