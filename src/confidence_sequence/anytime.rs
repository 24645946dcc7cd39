//! confidence_sequence::anytime — continuous-mixture betting confidence sequence.
//!
//! Purpose
//! -------
//! Maintain an anytime-valid interval for `E[w·r]` from a stream of
//! importance-weighted rewards. Each side bets against a candidate mean
//! with a continuum of betting fractions; the resulting log-wealth is
//! lower-bounded in closed form by a stitched boundary driven by a running
//! variance proxy, so `getci` costs O(1) regardless of the stream length.
//!
//! Key behaviors
//! -------------
//! - Rewards are mapped to `X = w·(r − rmin)/Δ` (lower side) and
//!   `X = w·(rmax − r)/Δ` (upper side), `Δ = rmax − rmin`.
//! - Predictable pseudo-means `x̂ = (ΣX + ½)/(t + 1)` center the variance
//!   proxies `Σ(X − x̂)²`, which expand into eleven running sums.
//! - Dropped (zero-weight) observations are folded in closed form: their
//!   only effect is `Σx̂²`, which telescopes through the trigamma function.
//! - With `adjust = true` the reward range grows to cover every observed
//!   reward, at the cost of a range no longer fixed in advance.
//!
//! Invariants & assumptions
//! ------------------------
//! - `t` counts real and dropped observations (possibly fractional when the
//!   expected drop count is used).
//! - Every running sum is an [`IncrementalSum`].
use crate::confidence_sequence::{
    errors::{CsError, CsResult},
    options::AnytimeOptions,
    validation::{validate_alpha, validate_drop, validate_weight},
};
use crate::interval::Interval;
use crate::numerics::{IncrementalSum, riemann_zeta, trigamma};
use tracing::trace;

/// AnytimeConfidenceSequence — continuous betting mixture over `E[w·r]`.
///
/// Fields
/// ------
/// - `options`: [`AnytimeOptions`] (`rmin`/`rmax` may widen with `adjust`).
/// - `t`: number of observations, including dropped ones.
/// - eleven [`IncrementalSum`]s of weight/reward/pseudo-mean moments.
#[derive(Debug, Clone, PartialEq)]
pub struct AnytimeConfidenceSequence {
    options: AnytimeOptions,
    t: f64,
    sumwsqrsq: IncrementalSum,
    sumwsqr: IncrementalSum,
    sumwsq: IncrementalSum,
    sumwr: IncrementalSum,
    sumw: IncrementalSum,
    sumwrxhatlow: IncrementalSum,
    sumwxhatlow: IncrementalSum,
    sumxhatlowsq: IncrementalSum,
    sumwrxhathigh: IncrementalSum,
    sumwxhathigh: IncrementalSum,
    sumxhathighsq: IncrementalSum,
}

impl AnytimeConfidenceSequence {
    pub fn new(options: AnytimeOptions) -> Self {
        AnytimeConfidenceSequence {
            options,
            t: 0.0,
            sumwsqrsq: IncrementalSum::new(),
            sumwsqr: IncrementalSum::new(),
            sumwsq: IncrementalSum::new(),
            sumwr: IncrementalSum::new(),
            sumw: IncrementalSum::new(),
            sumwrxhatlow: IncrementalSum::new(),
            sumwxhatlow: IncrementalSum::new(),
            sumxhatlowsq: IncrementalSum::new(),
            sumwrxhathigh: IncrementalSum::new(),
            sumwxhathigh: IncrementalSum::new(),
            sumxhathighsq: IncrementalSum::new(),
        }
    }

    /// Fold one observation, preceded by simulated dropped observations.
    ///
    /// Parameters
    /// ----------
    /// - `w`: `f64`
    ///   Importance weight, finite and `≥ 0`.
    /// - `r`: `f64`
    ///   Reward; must lie in `[rmin, rmax]` unless `adjust` is set.
    /// - `p_drop`: `f64`
    ///   Probability in `[0, 1)` that a record was dropped before logging;
    ///   the weight is rescaled by `1/(1 − p_drop)`.
    /// - `n_drop`: `Option<f64>`
    ///   Number of zero-weight records dropped before this one;
    ///   `None` uses the expectation `p_drop/(1 − p_drop)`.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidWeight`, `CsError::RewardOutOfRange`,
    ///   `CsError::InvalidDropProbability`, `CsError::InvalidDropCount`.
    pub fn addobs(&mut self, w: f64, r: f64, p_drop: f64, n_drop: Option<f64>) -> CsResult<()> {
        validate_weight(w)?;
        validate_drop(p_drop, n_drop)?;
        if !r.is_finite() {
            return Err(CsError::RewardOutOfRange {
                reward: r,
                rmin: self.options.rmin,
                rmax: self.options.rmax,
            });
        }
        if self.options.adjust {
            self.options.rmin = self.options.rmin.min(r);
            self.options.rmax = self.options.rmax.max(r);
        } else if r < self.options.rmin || r > self.options.rmax {
            return Err(CsError::RewardOutOfRange {
                reward: r,
                rmin: self.options.rmin,
                rmax: self.options.rmax,
            });
        }

        let n_drop = n_drop.unwrap_or(p_drop / (1.0 - p_drop));
        if n_drop > 0.0 {
            self.fold_dropped(n_drop);
        }

        let w = w / (1.0 - p_drop);
        let (xhatlow, xhathigh) = self.pseudo_means();
        let wr = w * r;
        self.sumwsqrsq.add(wr * wr);
        self.sumwsqr.add(w * wr);
        self.sumwsq.add(w * w);
        self.sumwr.add(wr);
        self.sumw.add(w);
        self.sumwrxhatlow.add(wr * xhatlow);
        self.sumwxhatlow.add(w * xhatlow);
        self.sumxhatlowsq.add(xhatlow * xhatlow);
        self.sumwrxhathigh.add(wr * xhathigh);
        self.sumwxhathigh.add(w * xhathigh);
        self.sumxhathighsq.add(xhathigh * xhathigh);
        self.t += 1.0;
        Ok(())
    }

    /// Anytime-valid interval at level `1 − alpha` (each side at `alpha/2`).
    ///
    /// Returns `[rmin, rmax]` before any observation or when the reward
    /// range is degenerate.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidAlpha`.
    pub fn getci(&self, alpha: f64) -> CsResult<Interval> {
        validate_alpha(alpha)?;
        let (rmin, rmax) = (self.options.rmin, self.options.rmax);
        if self.t <= 0.0 || rmin == rmax {
            return Ok(Interval::new(rmin, rmax));
        }
        let range = rmax - rmin;

        let sumw = self.sumw.value();
        let sumwr = self.sumwr.value();
        let sumwsq = self.sumwsq.value();
        let sumwsqr = self.sumwsqr.value();
        let sumwsqrsq = self.sumwsqrsq.value();

        let sum_x_low = (sumwr - sumw * rmin) / range;
        let sum_x_high = (sumw * rmax - sumwr) / range;
        let sum_v_low = (sumwsqrsq - 2.0 * rmin * sumwsqr + rmin * rmin * sumwsq) / (range * range)
            - 2.0 * (self.sumwrxhatlow.value() - rmin * self.sumwxhatlow.value()) / range
            + self.sumxhatlowsq.value();
        let sum_v_high = (sumwsqrsq - 2.0 * rmax * sumwsqr + rmax * rmax * sumwsq)
            / (range * range)
            + 2.0 * (self.sumwrxhathigh.value() - rmax * self.sumwxhathigh.value()) / range
            + self.sumxhathighsq.value();

        let half = 0.5 * alpha;
        let lb_low = self.lb_log_wealth(sum_x_low, sum_v_low, half);
        let lb_high = self.lb_log_wealth(sum_x_high, sum_v_high, half);
        trace!(t = self.t, sum_v_low, sum_v_high, lb_low, lb_high, "anytime interval");
        Ok(Interval::new(rmin + lb_low * range, rmin + (1.0 - lb_high) * range))
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn rmin(&self) -> f64 {
        self.options.rmin
    }

    pub fn rmax(&self) -> f64 {
        self.options.rmax
    }

    /// Predictable pseudo-means `(x̂_low, x̂_high)` before the next record.
    fn pseudo_means(&self) -> (f64, f64) {
        let (sum_x_low, sum_x_high) = self.sum_x();
        let denom = self.t + 1.0;
        ((sum_x_low + 0.5) / denom, (sum_x_high + 0.5) / denom)
    }

    fn sum_x(&self) -> (f64, f64) {
        let (rmin, rmax) = (self.options.rmin, self.options.rmax);
        let range = rmax - rmin;
        if range <= 0.0 {
            return (0.0, 0.0);
        }
        let sumw = self.sumw.value();
        let sumwr = self.sumwr.value();
        ((sumwr - sumw * rmin) / range, (sumw * rmax - sumwr) / range)
    }

    /// Account for `n_drop` zero-weight records: only `Σx̂²` moves, by
    /// `(ΣX + ½)²·Σ_k 1/(t+1+k)² = (ΣX + ½)²·(ψ₁(t+1) − ψ₁(t+1+n_drop))`.
    fn fold_dropped(&mut self, n_drop: f64) {
        let (sum_x_low, sum_x_high) = self.sum_x();
        let telescoped = trigamma(self.t + 1.0) - trigamma(self.t + 1.0 + n_drop);
        self.sumxhatlowsq.add((sum_x_low + 0.5).powi(2) * telescoped);
        self.sumxhathighsq.add((sum_x_high + 0.5).powi(2) * telescoped);
        self.t += n_drop;
    }

    /// Lower bound on the mean of `X ∈ [0, ∞)` from the stitched
    /// log-wealth boundary, clamped to `[0, 1]`.
    fn lb_log_wealth(&self, sum_x: f64, v: f64, alpha: f64) -> f64 {
        let (eta, s) = (self.options.eta, self.options.s);
        let v = v.max(1.0);
        let ell = s * (1.0 + v.ln() / eta.ln()).ln() + (riemann_zeta(s) / alpha).ln();
        let k1 = (eta.powf(0.25) + eta.powf(-0.25)) / std::f64::consts::SQRT_2;
        let k2 = (eta.sqrt() + 1.0) / 2.0;
        let boundary = (k1 * k1 * v * ell + k2 * k2 * ell * ell).sqrt() + k2 * ell;
        ((sum_x - boundary) / self.t).clamp(0.0, 1.0)
    }
}
