//! Cosets of the power-of-two subgroups of the circle group.

use super::index::CirclePointIndex;
use super::point::CirclePoint;
use crate::field::M31;

/// The coset `{initial + k * step : k in [0, 2^log_size)}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coset {
    /// Index of the first element.
    pub initial_index: CirclePointIndex,
    /// Index step between consecutive elements.
    pub step_size: CirclePointIndex,
    /// Log number of elements.
    pub log_size: u32,
}

impl Coset {
    /// Builds the coset of `2^log_size` elements starting at `initial_index`
    /// and stepping by the matching subgroup generator.
    pub fn new(initial_index: CirclePointIndex, log_size: u32) -> Self {
        Self {
            initial_index,
            step_size: CirclePointIndex::subgroup_gen(log_size),
            log_size,
        }
    }

    /// The subgroup of size `2^log_size`.
    pub fn subgroup(log_size: u32) -> Self {
        Self::new(CirclePointIndex::zero(), log_size)
    }

    /// The coset of odd multiples of the `2^(log_size + 1)` generator:
    /// `G_{2n} + <G_n>`.
    pub fn odds(log_size: u32) -> Self {
        Self::new(CirclePointIndex::subgroup_gen(log_size + 1), log_size)
    }

    /// The coset `G_{4n} + <G_n>`, i.e. the initial index is the generator of
    /// the subgroup four times larger.
    pub fn half_odds(log_size: u32) -> Self {
        Self::new(CirclePointIndex::subgroup_gen(log_size + 2), log_size)
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        1 << self.log_size
    }

    /// Index of the `i`-th element.
    pub fn index_at(&self, i: usize) -> CirclePointIndex {
        self.initial_index + self.step_size * i
    }

    /// Materializes the `i`-th element.
    pub fn at(&self, i: usize) -> CirclePoint<M31> {
        self.index_at(i).to_point()
    }

    /// The step between consecutive elements as a point.
    pub fn step(&self) -> CirclePoint<M31> {
        self.step_size.to_point()
    }

    /// Shifts every element by `shift_size`.
    pub fn shift(self, shift_size: CirclePointIndex) -> Self {
        Self {
            initial_index: self.initial_index + shift_size,
            ..self
        }
    }

    /// The conjugate coset `{-initial - k * step}`.
    pub fn conjugate(self) -> Self {
        Self {
            initial_index: -self.initial_index,
            step_size: -self.step_size,
            log_size: self.log_size,
        }
    }

    /// Applies the doubling map element-wise, halving the coset.
    pub fn double(self) -> Self {
        debug_assert!(self.log_size > 0);
        Self {
            initial_index: self.initial_index + self.initial_index,
            step_size: self.step_size + self.step_size,
            log_size: self.log_size - 1,
        }
    }
}

/// The canonical trace coset of log size `k`: the odds coset whose circle
/// domain is the standard evaluation domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicCoset {
    /// The underlying odds coset.
    pub coset: Coset,
}

impl CanonicCoset {
    /// Builds the canonic coset of `2^log_size` elements.
    pub fn new(log_size: u32) -> Self {
        debug_assert!(log_size > 0);
        Self {
            coset: Coset::odds(log_size),
        }
    }

    /// Log number of elements.
    pub fn log_size(&self) -> u32 {
        self.coset.log_size
    }

    /// The half coset defining the associated circle domain.
    pub fn half_coset(&self) -> Coset {
        Coset::half_odds(self.log_size() - 1)
    }

    /// The standard circle domain of twice the half-coset size.
    pub fn circle_domain(&self) -> super::domain::CircleDomain {
        super::domain::CircleDomain::new(self.half_coset())
    }

    /// The trace step, i.e. the generator of the size-`2^log_size` subgroup.
    pub fn step(&self) -> CirclePoint<M31> {
        CirclePointIndex::subgroup_gen(self.log_size()).to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_odds_initial_index() {
        let coset = Coset::half_odds(5);
        assert_eq!(
            coset.initial_index,
            CirclePointIndex::subgroup_gen(7),
            "half odds of log size k starts at the 2^(29 - k) index"
        );
        assert_eq!(coset.step_size, CirclePointIndex::subgroup_gen(5));
    }

    #[test]
    fn conjugate_enumerates_negated_points() {
        let coset = Coset::odds(4);
        let conjugate = coset.conjugate();
        for i in 0..coset.size() {
            assert_eq!(conjugate.at(i), coset.at(i).conjugate());
        }
    }

    #[test]
    fn double_applies_the_doubling_map() {
        let coset = Coset::half_odds(3);
        let doubled = coset.double();
        assert_eq!(doubled.log_size, 2);
        for i in 0..doubled.size() {
            assert_eq!(doubled.at(i), coset.at(i).double());
        }
    }

    #[test]
    fn canonic_coset_step_has_subgroup_order() {
        let canonic = CanonicCoset::new(6);
        let step = canonic.step();
        assert_eq!(step.mul(1 << 6), CirclePoint::zero());
        assert_ne!(step.mul(1 << 5), CirclePoint::zero());
    }

    #[test]
    fn shift_translates_every_element() {
        let coset = Coset::subgroup(3);
        let shift = CirclePointIndex::subgroup_gen(5);
        let shifted = coset.shift(shift);
        for i in 0..coset.size() {
            assert_eq!(shifted.index_at(i), coset.index_at(i) + shift);
        }
    }
}
