//! confidence_sequence::ddrm — doubly robust ratio interval from two mixtures.
//!
//! Bounds the value `E[w·r]` of a target policy with rewards in `[0, 1]`
//! using two independent [`RobustMixture`]s: one lower-bounds `E[w·r]`,
//! the other lower-bounds `E[w·(1 − r)]`, whose complement is the upper
//! end. Each side runs at `alpha/2`. Both members are lower-only
//! mixtures, since only their lower ends are read.
use crate::confidence_sequence::{
    errors::{CsError, CsResult},
    options::RobustMixtureOptions,
    robust_mixture::RobustMixture,
    validation::{validate_alpha, validate_weight},
};
use crate::interval::Interval;

/// DDRM — pair of countable mixtures over `w·r` and `w·(1 − r)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ddrm {
    reward: RobustMixture,
    complement: RobustMixture,
}

impl Ddrm {
    pub fn new(options: RobustMixtureOptions) -> Self {
        Ddrm {
            reward: RobustMixture::lower_only(options),
            complement: RobustMixture::lower_only(options),
        }
    }

    /// Fold one `(w, r)` pair into both mixtures.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidWeight` for negative or non-finite `w`.
    /// - `CsError::RewardOutOfRange` unless `r ∈ [0, 1]`.
    pub fn addobs(&mut self, (w, r): (f64, f64)) -> CsResult<()> {
        validate_weight(w)?;
        if !(0.0..=1.0).contains(&r) {
            return Err(CsError::RewardOutOfRange { reward: r, rmin: 0.0, rmax: 1.0 });
        }
        self.reward.addobs(w * r)?;
        self.complement.addobs(w * (1.0 - r))?;
        Ok(())
    }

    /// `(lower bound on E[w·r], 1 − lower bound on E[w·(1 − r)])`.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidAlpha`.
    pub fn getci(&self, alpha: f64) -> CsResult<Interval> {
        validate_alpha(alpha)?;
        let half = alpha / 2.0;
        let lower = self.reward.lower_bound(half)?;
        let upper = 1.0 - self.complement.lower_bound(half)?;
        Ok(Interval::new(lower, upper))
    }

    pub fn t(&self) -> f64 {
        self.reward.t()
    }
}

impl Default for Ddrm {
    fn default() -> Self {
        Ddrm::new(RobustMixtureOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Monotone convergence of the lower end on a perfect-reward stream,
    //   with lower-only members.
    // - Input validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the lower end on E[w·r] rises toward 1 when every record has
    // w = 1 and r = 1.
    //
    // Given
    // -----
    // - Intervals read at t = 10, 100, 1000, 5000.
    //
    // Expect
    // ------
    // - Non-decreasing lower ends, strictly larger at 5000 than at 1000,
    //   above 0.7 at the end; the upper end stays at 1.
    fn perfect_rewards_drive_lower_end_toward_one() {
        // Arrange
        let mut ddrm = Ddrm::default();
        let checkpoints = [10, 100, 1000, 5000];
        let mut lowers = Vec::new();

        // Act
        for i in 1..=5000 {
            ddrm.addobs((1.0, 1.0)).expect("valid pair");
            if checkpoints.contains(&i) {
                let ci = ddrm.getci(0.05).expect("valid alpha");
                assert_eq!(ci.upper, 1.0);
                lowers.push(ci.lower);
            }
        }

        // Assert
        for pair in lowers.windows(2) {
            assert!(pair[1] >= pair[0], "{lowers:?}");
        }
        assert!(lowers[3] > lowers[2], "{lowers:?}");
        assert!(lowers[3] > 0.7 && lowers[3] < 1.0, "{lowers:?}");
        assert_eq!(ddrm.t(), 5000.0);
        assert_eq!(ddrm.reward.getci(0.05).expect("valid alpha").upper, f64::INFINITY);
        assert_eq!(ddrm.complement.getci(0.05).expect("valid alpha").upper, f64::INFINITY);
    }

    #[test]
    // Purpose
    // -------
    // Ensure pairs outside the contract are rejected.
    //
    // Given
    // -----
    // - r = 1.5 and w = -1.
    //
    // Expect
    // ------
    // - `RewardOutOfRange` and `InvalidWeight`.
    fn addobs_validates_pairs() {
        let mut ddrm = Ddrm::default();
        assert!(matches!(ddrm.addobs((1.0, 1.5)), Err(CsError::RewardOutOfRange { .. })));
        assert!(matches!(ddrm.addobs((-1.0, 0.5)), Err(CsError::InvalidWeight { .. })));
        assert_eq!(ddrm.t(), 0.0);
    }
}
