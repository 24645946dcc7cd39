//! confidence_sequence::robust_mixture — countable betting mixture.
//!
//! Purpose
//! -------
//! Anytime-valid interval for the mean of a non-negative stream whose
//! values may be heavy-tailed (polynomial rather than sub-exponential
//! tails). Wealth is mixed over a geometric grid of betting fractions and
//! the per-fraction shortfall is bounded by [`GTilde`].
//!
//! Key behaviors
//! -------------
//! - Betting fractions `λ_j = λ_max·ξ^−(j+½)/√(t+1)` with prior weights
//!   `π_j = (1 − 1/ξ)·ξ^−j`, `j = 0, 1, ...`.
//! - Log-wealth of fraction `j` at candidate mean `μ`:
//!   `λ_j·(Σx − t·μ) − V(λ_j)`, with `V` from [`GTilde::get_v`].
//! - The infinite mixture is evaluated lazily: terms are added with
//!   `log_add_exp` until the partial sum reaches the threshold, or until
//!   the partial sum plus the tail bound `π_{≥J}·exp(λ_J·max(Σx − tμ, 0))`
//!   stays below it.
//! - The lower bound is the boundary of the rejected set `{μ : wealth ≥
//!   −ln α}`, found by bisection after checking `μ = 0` and `μ = 1`.
//! - The upper end comes from a mirrored tracker on `1 − x`, available
//!   while every `x ≤ 1`; afterwards it is `+∞`. Mixtures built with
//!   [`RobustMixture::lower_only`] never carry the mirror.
//!
//! Invariants & assumptions
//! ------------------------
//! - Wealth is non-increasing in `μ`, so the rejected set is an interval
//!   `[0, boundary)` and bisection is valid.
//! - The returned lower end is the rejected side of the final bracket,
//!   never above the true boundary.
use crate::confidence_sequence::{
    errors::CsResult,
    g_tilde::GTilde,
    options::RobustMixtureOptions,
    validation::{validate_alpha, validate_nonnegative},
};
use crate::interval::Interval;
use crate::numerics::{BISECTION_MAX_ITER, BISECTION_TOL, bisect_boundary, log_add_exp};
use tracing::{debug, trace};

/// Hard cap on the number of mixture terms evaluated per wealth query.
pub const MAX_MIXTURE_TERMS: usize = 512;

/// RobustMixture — countable betting mixture with an optional mirror.
///
/// Fields
/// ------
/// - `options`: [`RobustMixtureOptions`].
/// - `gt`: tracker of `x`, used for the lower end.
/// - `mirror`: tracker of `1 − x`, dropped after the first `x > 1` and
///   absent in lower-only mixtures.
#[derive(Debug, Clone, PartialEq)]
pub struct RobustMixture {
    options: RobustMixtureOptions,
    gt: GTilde,
    mirror: Option<GTilde>,
}

impl RobustMixture {
    pub fn new(options: RobustMixtureOptions) -> Self {
        RobustMixture { options, gt: GTilde::new(options.k), mirror: Some(GTilde::new(options.k)) }
    }

    /// Mixture that only serves [`lower_bound`](Self::lower_bound); `getci`
    /// reports `+∞` as its upper end.
    pub fn lower_only(options: RobustMixtureOptions) -> Self {
        RobustMixture { options, gt: GTilde::new(options.k), mirror: None }
    }

    /// Fold one observation `x ≥ 0`.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidObservation` for negative or non-finite `x`.
    pub fn addobs(&mut self, x: f64) -> CsResult<()> {
        validate_nonnegative(x)?;
        self.gt.addobs(x)?;
        if x > 1.0 {
            if self.mirror.take().is_some() {
                debug!(x, "observation above 1; upper end is no longer bounded");
            }
        } else if let Some(mirror) = self.mirror.as_mut() {
            mirror.addobs(1.0 - x)?;
        }
        Ok(())
    }

    /// Anytime-valid interval at level `1 − alpha` (each end at `alpha/2`).
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidAlpha`.
    pub fn getci(&self, alpha: f64) -> CsResult<Interval> {
        validate_alpha(alpha)?;
        let lower = self.lower_bound(alpha / 2.0)?;
        let upper = match &self.mirror {
            Some(mirror) => 1.0 - self.bound_for(mirror, alpha / 2.0),
            None => f64::INFINITY,
        };
        Ok(Interval::new(lower, upper))
    }

    /// One-sided lower confidence bound on the mean at level `1 − alpha`.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidAlpha`.
    pub fn lower_bound(&self, alpha: f64) -> CsResult<f64> {
        validate_alpha(alpha)?;
        Ok(self.bound_for(&self.gt, alpha))
    }

    pub fn t(&self) -> f64 {
        self.gt.t()
    }

    /// Boundary of the rejected set of `tracker` against `−ln alpha`.
    fn bound_for(&self, tracker: &GTilde, alpha: f64) -> f64 {
        let threshold = -alpha.ln();
        let mut memo = Vec::new();
        let mut rejects =
            |mu: f64| self.log_wealth(tracker, mu, threshold, &mut memo) >= threshold;

        if !rejects(0.0) {
            return 0.0;
        }
        if rejects(1.0) {
            return 1.0;
        }
        let (lo, _hi) = bisect_boundary(0.0, 1.0, BISECTION_TOL, BISECTION_MAX_ITER, rejects);
        lo
    }

    /// Log mixture wealth at `mu`, resolved only as far as needed to
    /// compare it with `threshold`.
    ///
    /// The returned value is on the same side of `threshold` as the exact
    /// mixture wealth: a partial sum when that already reaches the
    /// threshold, an upper bound when that stays below it. `memo[j]` caches
    /// `V(λ_j)`, which does not depend on `mu`.
    fn log_wealth(&self, tracker: &GTilde, mu: f64, threshold: f64, memo: &mut Vec<f64>) -> f64 {
        let RobustMixtureOptions { xi, lambda_max, .. } = self.options;
        let ln_xi = xi.ln();
        let ln_head = (1.0 - 1.0 / xi).ln();
        let scale = lambda_max / (tracker.t() + 1.0).sqrt();
        let drift = tracker.sum_x() - tracker.t() * mu;
        let lambda = |j: usize| scale * xi.powf(-(j as f64 + 0.5));

        let mut partial = f64::NEG_INFINITY;
        for j in 0..MAX_MIXTURE_TERMS {
            if memo.len() <= j {
                memo.push(tracker.get_v(lambda(j)));
            }
            let term = ln_head - j as f64 * ln_xi + lambda(j) * drift - memo[j];
            partial = log_add_exp(partial, term);
            if partial >= threshold {
                return partial;
            }
            let next = j + 1;
            let tail = -(next as f64) * ln_xi + lambda(next) * drift.max(0.0);
            let upper = log_add_exp(partial, tail);
            if upper < threshold {
                return upper;
            }
        }
        trace!(mu, partial, "mixture term cap reached");
        partial
    }
}

impl Default for RobustMixture {
    fn default() -> Self {
        RobustMixture::new(RobustMixtureOptions::default())
    }
}
