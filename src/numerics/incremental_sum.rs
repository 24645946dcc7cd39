//! numerics::incremental_sum — compensated streaming summation.
//!
//! Purpose
//! -------
//! Keep the exactly rounded sum of an unbounded stream of `f64` increments.
//! Every running moment in the crate (Cressie-Read sufficient statistics,
//! betting-wealth sums, GTilde variance buckets) is an [`IncrementalSum`],
//! because streaming millions of bandit observations through naïve `+=`
//! loses precision catastrophically once the running total dwarfs the
//! individual increments.
//!
//! Key behaviors
//! -------------
//! - Maintain a list of non-overlapping partials ordered by increasing
//!   magnitude (Shewchuk's algorithm, as in `math.fsum`).
//! - `add` folds the new value through the partials, splitting off the
//!   rounding residual at each step; amortized O(log n) partials are kept.
//! - `value` adds the partials from the top with a half-even correction so
//!   the result is the correctly rounded exact sum.
//! - `merge` / `Add` combine two independently accumulated sums; `scale`
//!   multiplies the represented sum (exponential forgetting).
//!
//! Invariants & assumptions
//! ------------------------
//! - Finite partials never overlap: `|partials[i]| < ulp(partials[i + 1])`
//!   after every `add`.
//! - Non-finite increments (NaN, ±∞) and overflow are routed to a separate
//!   accumulator and dominate `value`, following IEEE semantics.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the `[1e16, 1.0, -1e16]` cancellation case, merge
//!   equivalence, scaling, and non-finite propagation.
use std::ops::{Add, AddAssign};

/// IncrementalSum — exactly rounded running sum of `f64` increments.
///
/// Fields
/// ------
/// - `partials`: `Vec<f64>`
///   Non-overlapping partial sums in increasing magnitude.
/// - `special`: `f64`
///   Plain sum of non-finite increments (and overflowed partials). Zero as
///   long as the stream is finite.
///
/// Performance
/// -----------
/// - `add` is O(len(partials)), which stays logarithmic in practice.
/// - `value` is O(len(partials)) and does not mutate the state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncrementalSum {
    partials: Vec<f64>,
    special: f64,
}

impl IncrementalSum {
    /// Empty sum (reads back as `0.0`).
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `x` into the running sum.
    pub fn add(&mut self, x: f64) {
        if !x.is_finite() {
            self.special += x;
            return;
        }

        let mut x = x;
        let mut i = 0;
        for j in 0..self.partials.len() {
            let mut y = self.partials[j];
            if x.abs() < y.abs() {
                std::mem::swap(&mut x, &mut y);
            }
            let hi = x + y;
            if !hi.is_finite() {
                // Overflow: the exact sum is no longer representable.
                self.special += hi;
                self.partials.clear();
                return;
            }
            let lo = y - (hi - x);
            if lo != 0.0 {
                self.partials[i] = lo;
                i += 1;
            }
            x = hi;
        }
        self.partials.truncate(i);
        self.partials.push(x);
    }

    /// Correctly rounded value of the represented sum.
    pub fn value(&self) -> f64 {
        if self.special != 0.0 || self.special.is_nan() {
            return self.special;
        }

        let partials = &self.partials;
        let Some(&top) = partials.last() else {
            return 0.0;
        };

        let mut hi = top;
        let mut lo = 0.0;
        let mut k = partials.len() - 1;
        while k > 0 {
            k -= 1;
            let x = hi;
            let y = partials[k];
            hi = x + y;
            let yr = hi - x;
            lo = y - yr;
            if lo != 0.0 {
                break;
            }
        }

        // Round half to even across the remaining partials.
        if k > 0 && ((lo < 0.0 && partials[k - 1] < 0.0) || (lo > 0.0 && partials[k - 1] > 0.0))
        {
            let y = lo * 2.0;
            let x = hi + y;
            let yr = x - hi;
            if y == yr {
                hi = x;
            }
        }
        hi
    }

    /// Fold every partial of `other` into `self`.
    pub fn merge(&mut self, other: &IncrementalSum) {
        self.special += other.special;
        for &p in &other.partials {
            self.add(p);
        }
    }

    /// Multiply the represented sum by `factor`.
    ///
    /// Scaled partials may overlap after rounding, so they are re-folded to
    /// restore the non-overlapping invariant. A factor of exactly `1.0` is a
    /// no-op, which keeps undecayed accumulation bit-for-bit replayable.
    pub fn scale(&mut self, factor: f64) {
        if factor == 1.0 {
            return;
        }
        self.special *= factor;
        let old = std::mem::take(&mut self.partials);
        for p in old {
            self.add(p * factor);
        }
    }

}

impl AddAssign<f64> for IncrementalSum {
    fn add_assign(&mut self, rhs: f64) {
        self.add(rhs);
    }
}

impl Add for IncrementalSum {
    type Output = IncrementalSum;

    fn add(mut self, rhs: IncrementalSum) -> IncrementalSum {
        self.merge(&rhs);
        self
    }
}

impl From<&IncrementalSum> for f64 {
    fn from(sum: &IncrementalSum) -> f64 {
        sum.value()
    }
}

impl From<IncrementalSum> for f64 {
    fn from(sum: IncrementalSum) -> f64 {
        sum.value()
    }
}

impl FromIterator<f64> for IncrementalSum {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut sum = IncrementalSum::new();
        for x in iter {
            sum += x;
        }
        sum
    }
}

impl Extend<f64> for IncrementalSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact cancellation behavior that naïve summation gets wrong.
    // - Equivalence of `merge` / `Add` with sequential accumulation.
    // - `scale` and non-finite propagation.
    //
    // They intentionally DO NOT cover:
    // - Performance characteristics of long streams.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the canonical catastrophic-cancellation case.
    //
    // Given
    // -----
    // - Increments [1e16, 1.0, -1e16] added in that order.
    //
    // Expect
    // ------
    // - The compensated sum is exactly 1.0 while naïve addition yields 0.0.
    fn incremental_sum_recovers_small_term_under_cancellation() {
        // Arrange
        let xs = [1e16_f64, 1.0, -1e16];
        let mut sum = IncrementalSum::new();

        // Act
        for &x in &xs {
            sum += x;
        }
        let naive: f64 = xs.iter().fold(0.0, |acc, &x| acc + x);

        // Assert
        assert_eq!(f64::from(&sum), 1.0);
        assert_eq!(naive, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Check that repeated tenths add up to the correctly rounded total.
    //
    // Given
    // -----
    // - Ten copies of 0.1.
    //
    // Expect
    // ------
    // - The value equals 1.0 exactly (naïve summation gives 0.9999999999999999).
    fn incremental_sum_of_tenths_is_correctly_rounded() {
        // Arrange / Act
        let sum: IncrementalSum = std::iter::repeat_n(0.1_f64, 10).collect();

        // Assert
        assert_eq!(sum.value(), 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that merging two independently accumulated sums matches
    // feeding every increment into a single accumulator.
    //
    // Given
    // -----
    // - Two halves of a stream with mixed magnitudes.
    //
    // Expect
    // ------
    // - `left + right` and `merge` both read back as the sequential sum.
    fn incremental_sum_merge_matches_sequential_accumulation() {
        // Arrange
        let first = [1e20_f64, 3.0, -7.5, 1e-3];
        let second = [-1e20_f64, 2.25, 1e-3, 0.125];
        let sequential: IncrementalSum = first.iter().chain(second.iter()).copied().collect();
        let left: IncrementalSum = first.iter().copied().collect();
        let right: IncrementalSum = second.iter().copied().collect();

        // Act
        let mut merged = left.clone();
        merged.merge(&right);
        let added = left + right;

        // Assert
        assert_eq!(merged.value(), sequential.value());
        assert_eq!(added.value(), sequential.value());
    }

    #[test]
    // Purpose
    // -------
    // Verify that `scale` multiplies the represented sum and that a unit
    // factor leaves the partials untouched.
    //
    // Given
    // -----
    // - A sum of 1.5 and 2.5.
    //
    // Expect
    // ------
    // - Scaling by 0.5 yields 2.0; scaling by 1.0 keeps the state equal.
    fn incremental_sum_scale_multiplies_value() {
        // Arrange
        let mut sum: IncrementalSum = [1.5_f64, 2.5].into_iter().collect();
        let snapshot = sum.clone();

        // Act
        sum.scale(1.0);
        let unchanged = sum == snapshot;
        sum.scale(0.5);

        // Assert
        assert!(unchanged);
        assert_eq!(sum.value(), 2.0);
    }

    #[test]
    // Purpose
    // -------
    // Non-finite increments must propagate per IEEE semantics.
    //
    // Given
    // -----
    // - A finite prefix followed by +∞, and separately a NaN.
    //
    // Expect
    // ------
    // - The first reads back as +∞, the second as NaN.
    fn incremental_sum_propagates_non_finite_values() {
        // Arrange
        let mut inf_sum: IncrementalSum = [1.0_f64, 2.0].into_iter().collect();
        let mut nan_sum = IncrementalSum::new();

        // Act
        inf_sum += f64::INFINITY;
        nan_sum += f64::NAN;

        // Assert
        assert_eq!(inf_sum.value(), f64::INFINITY);
        assert!(nan_sum.value().is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Ensure the iterator entry points fold through the compensated path.
    //
    // Given
    // -----
    // - The stream [1e16, 1.0, -1e16, 0.5] consumed by `collect` and by
    //   `extend` on a fresh sum.
    //
    // Expect
    // ------
    // - Both read back as exactly 1.5.
    fn incremental_sum_collect_and_extend_are_exact() {
        // Arrange
        let xs = [1e16_f64, 1.0, -1e16, 0.5];
        let mut extended = IncrementalSum::new();

        // Act
        let collected: IncrementalSum = xs.iter().copied().collect();
        extended.extend(xs);

        // Assert
        assert_eq!(collected.value(), 1.5);
        assert_eq!(extended.value(), 1.5);
    }
}
