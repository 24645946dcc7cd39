//! cressie_read::online — streaming Cressie-Read bounds with forgetting.
//!
//! Purpose
//! -------
//! Wrap a [`StatsAccumulator`] and the batch solver so that bounds and the
//! importance-correction functional can be queried after every
//! observation. Observations may be exponentially forgotten with a decay
//! factor `tau`.
//!
//! Key behaviors
//! -------------
//! - [`OnlineCressieRead::update`] validates and folds one observation and
//!   resets both cached duals to [`DualState::Unset`].
//! - Reads (`lower_bound`, `upper_bound`, `qlb`, ...) recompute an `Unset`
//!   side eagerly and cache the result until the next update.
//! - Bounds always use the `χ²(1)` critical value.
//!
//! Invariants & assumptions
//! ------------------------
//! - With `tau = 1`, every bound equals the batch solver's bound on the
//!   accumulated snapshot (with `CriticalValue::ChiSquared`).
//! - Before the first observation with positive count, each side reports
//!   its trivial bound and `qlb` is `1`.
use crate::cressie_read::{
    batch::CrMinusTwo,
    dual::{DualState, Side, SideSolution},
    errors::CrResult,
    options::{CrBounds, CrOptions, CriticalValue},
    sufficient_stats::{StatsAccumulator, SufficientStatistics},
    validation::validate_alpha,
};
use crate::interval::Interval;
use tracing::debug;

/// OnlineCressieRead — incrementally updated Cressie-Read bounds.
///
/// Fields
/// ------
/// - `solver`: [`CrMinusTwo`] configured with the `χ²(1)` critical value.
/// - `alpha`: per-side significance level.
/// - `stats`: running [`StatsAccumulator`] with decay `tau`.
/// - `lower`, `upper`: cached [`DualState`] per side.
#[derive(Debug, Clone, PartialEq)]
pub struct OnlineCressieRead {
    solver: CrMinusTwo,
    alpha: f64,
    stats: StatsAccumulator,
    lower: DualState,
    upper: DualState,
}

impl OnlineCressieRead {
    /// Construct an empty estimator.
    ///
    /// Parameters
    /// ----------
    /// - `options`: `CrOptions`
    ///   Bounds and flags; the critical-value family is overridden to
    ///   `χ²(1)`.
    /// - `alpha`: `f64`
    ///   Significance level in `(0, 1)` applied to each side.
    /// - `tau`: `f64`
    ///   Decay factor in `(0, 1]`; `1` disables forgetting.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidAlpha`, `CrError::InvalidDecay`.
    pub fn new(options: CrOptions, alpha: f64, tau: f64) -> CrResult<Self> {
        validate_alpha(alpha)?;
        let options = options.with_critical_value(CriticalValue::ChiSquared);
        Ok(OnlineCressieRead {
            solver: CrMinusTwo::new(options),
            alpha,
            stats: StatsAccumulator::new(&options, tau)?,
            lower: DualState::Unset,
            upper: DualState::Unset,
        })
    }

    /// Fold one `(count, weight, reward)` observation.
    ///
    /// Errors
    /// ------
    /// - Observation validation failures; the state is unchanged on error.
    pub fn update(&mut self, count: f64, weight: f64, reward: Option<f64>) -> CrResult<&mut Self> {
        self.stats.observe(count, weight, reward)?;
        self.lower = DualState::Unset;
        self.upper = DualState::Unset;
        Ok(self)
    }

    /// Recompute and cache the dual of one side.
    ///
    /// Errors
    /// ------
    /// - `CrError::NoFeasibleBranch` when `raise_on_err` is set and the
    ///   side is degenerate.
    pub fn recompute_duals(&mut self, side: Side) -> CrResult<SideSolution> {
        let snapshot = self.stats.snapshot();
        let solution = if snapshot.n > 0.0 {
            self.solver.solve_side(&snapshot, self.alpha, side)?
        } else {
            SideSolution { bound: side.reward(self.bounds()), dual: None }
        };
        debug!(side = side.label(), n = snapshot.n, bound = solution.bound, "recomputed duals");
        *self.state_mut(side) = DualState::Computed(solution);
        Ok(solution)
    }

    /// Cached solution of `side`, recomputing it if unset.
    pub fn solution(&mut self, side: Side) -> CrResult<SideSolution> {
        let state = *self.state_mut(side);
        match state {
            DualState::Computed(solution) => Ok(solution),
            DualState::Unset => self.recompute_duals(side),
        }
    }

    pub fn lower_bound(&mut self) -> CrResult<f64> {
        Ok(self.solution(Side::Lower)?.bound)
    }

    pub fn upper_bound(&mut self) -> CrResult<f64> {
        Ok(self.solution(Side::Upper)?.bound)
    }

    pub fn interval(&mut self) -> CrResult<Interval> {
        Ok(Interval::new(self.lower_bound()?, self.upper_bound()?))
    }

    /// Importance correction of a hypothetical `(w, r)` under the
    /// lower-side dual; `1` when that dual is degenerate or absent.
    pub fn qlb(&mut self, weight: f64, reward: f64) -> CrResult<f64> {
        Ok(self
            .solution(Side::Lower)?
            .dual
            .map_or(1.0, |dual| dual.qfunc.evaluate(weight, reward)))
    }

    /// Point estimate on the current statistics; `None` before any data or
    /// when the censored ratio has no observed mass.
    pub fn estimate(&self) -> CrResult<Option<f64>> {
        let snapshot = self.stats.snapshot();
        if snapshot.n <= 0.0 {
            return Ok(None);
        }
        self.solver.estimate(&snapshot)
    }

    pub fn statistics(&self) -> SufficientStatistics {
        self.stats.snapshot()
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn bounds(&self) -> &CrBounds {
        &self.solver.options().bounds
    }

    fn state_mut(&mut self, side: Side) -> &mut DualState {
        match side {
            Side::Lower => &mut self.lower,
            Side::Upper => &mut self.upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cressie_read::errors::CrError;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Replay equivalence with the batch solver at every step (tau = 1).
    // - Cache invalidation and the `qlb` fallback.
    // - The reweighting identities of the cached duals.
    // - Forgetting with tau < 1 and input validation.
    // -------------------------------------------------------------------------

    fn options() -> CrOptions {
        CrOptions::new(CrBounds::new(0.0, 20.0, 0.0, 1.0).expect("valid bounds"))
    }

    #[test]
    // Purpose
    // -------
    // Verify that streaming one record at a time reproduces the batch
    // bounds exactly.
    //
    // Given
    // -----
    // - 60 seeded records; a batch solver with the χ²(1) critical value
    //   fed the running sufficient statistics.
    //
    // Expect
    // ------
    // - Identical lower and upper bounds after every record.
    fn online_matches_batch_after_every_update() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(42);
        let mut online = OnlineCressieRead::new(options(), 0.05, 1.0).expect("valid config");
        let batch = CrMinusTwo::new(options().with_critical_value(CriticalValue::ChiSquared));
        let mut acc = StatsAccumulator::new(&options(), 1.0).expect("valid tau");

        for _ in 0..60 {
            let w = rng.random_range(0.0..5.0);
            let r = rng.random::<f64>();

            // Act
            online.update(1.0, w, Some(r)).expect("valid record");
            acc.observe(1.0, w, Some(r)).expect("valid record");
            let expected = batch.interval(&acc.snapshot(), 0.05).expect("valid batch");

            // Assert
            assert_eq!(online.interval().expect("valid online"), expected);
        }
    }

    #[test]
    // Purpose
    // -------
    // Check cache lifecycle and the identity fallback of `qlb`.
    //
    // Given
    // -----
    // - A fresh estimator, then a few records.
    //
    // Expect
    // ------
    // - Before data: trivial bounds and qlb = 1.
    // - After an update both duals are unset until read.
    fn dual_cache_is_invalidated_on_update() {
        // Arrange
        let mut online = OnlineCressieRead::new(options(), 0.1, 1.0).expect("valid config");

        // Act & Assert
        assert_eq!(online.interval().expect("empty"), Interval::new(0.0, 1.0));
        assert_eq!(online.qlb(3.0, 0.5).expect("empty"), 1.0);
        assert_eq!(online.estimate().expect("empty"), None);

        online
            .update(1.0, 0.5, Some(0.2))
            .and_then(|o| o.update(1.0, 2.0, Some(0.9)))
            .and_then(|o| o.update(1.0, 1.0, Some(0.4)))
            .expect("valid records");
        assert!(online.lower.is_unset() && online.upper.is_unset());

        let q = online.qlb(1.0, 0.4).expect("dual");
        assert!(q.is_finite());
        assert!(!online.lower.is_unset());
        assert!(online.upper.is_unset());
    }

    #[test]
    // Purpose
    // -------
    // Verify that the cached duals reweight the fake-augmented sample onto
    // the constraint set and reproduce each bound.
    //
    // Given
    // -----
    // - 150 seeded unit-count records plus the winning fake point
    //   `(wfake, r_side)` of each side, N = n + 1 points in total.
    //
    // Expect
    // ------
    // - mean q = 1, mean q·w = 1, and mean q·w·r equals the side's bound,
    //   with `qlb` agreeing with the lower-side `QFunc`.
    fn qfunc_reweights_augmented_sample_onto_bound() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(7);
        let mut online = OnlineCressieRead::new(options(), 0.05, 1.0).expect("valid config");
        let mut records = Vec::new();
        for _ in 0..150 {
            let w = rng.random_range(0.0..3.0);
            let r = rng.random::<f64>();
            online.update(1.0, w, Some(r)).expect("valid record");
            records.push((w, r));
        }
        let big_n = records.len() as f64 + 1.0;

        for side in [Side::Lower, Side::Upper] {
            // Act
            let solution = online.solution(side).expect("solved side");
            let dual = solution.dual.expect("feasible branch");
            let fake = (dual.wfake, side.reward(online.bounds()));
            let (mut q_sum, mut qw_sum, mut qwr_sum) = (0.0, 0.0, 0.0);
            for &(w, r) in records.iter().chain(std::iter::once(&fake)) {
                let q = dual.qfunc.evaluate(w, r);
                if side == Side::Lower {
                    assert_eq!(online.qlb(w, r).expect("cached dual"), q);
                }
                q_sum += q;
                qw_sum += q * w;
                qwr_sum += q * w * r;
            }

            // Assert
            assert!(dual.kappastar > 0.0, "{side:?}: {dual:?}");
            assert!(0.0 < solution.bound && solution.bound < 1.0, "{solution:?}");
            assert_abs_diff_eq!(q_sum / big_n, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(qw_sum / big_n, 1.0, epsilon = 1e-9);
            assert_abs_diff_eq!(qwr_sum / big_n, solution.bound, epsilon = 1e-9);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure forgetting down-weights history.
    //
    // Given
    // -----
    // - tau = 0.5 and two unit-count records.
    //
    // Expect
    // ------
    // - n = 1.5 in the snapshot.
    fn decay_shrinks_effective_sample() {
        // Arrange
        let mut online = OnlineCressieRead::new(options(), 0.05, 0.5).expect("valid config");

        // Act
        online.update(1.0, 1.0, Some(1.0)).expect("valid record");
        online.update(1.0, 1.0, Some(0.0)).expect("valid record");

        // Assert
        assert_relative_eq!(online.statistics().n, 1.5);
    }

    #[test]
    // Purpose
    // -------
    // Verify constructor and update validation.
    //
    // Given
    // -----
    // - alpha = 0, tau = 0, and a reward outside [0, 1].
    //
    // Expect
    // ------
    // - The corresponding `CrError` variants.
    fn online_rejects_invalid_configuration_and_records() {
        assert!(matches!(
            OnlineCressieRead::new(options(), 0.0, 1.0),
            Err(CrError::InvalidAlpha { .. })
        ));
        assert!(matches!(
            OnlineCressieRead::new(options(), 0.05, 0.0),
            Err(CrError::InvalidDecay { .. })
        ));
        let mut online = OnlineCressieRead::new(options(), 0.05, 1.0).expect("valid config");
        assert!(matches!(
            online.update(1.0, 1.0, Some(2.0)),
            Err(CrError::RewardOutOfRange { .. })
        ));
    }
}
