//! cressie_read::options — bounds and solver configuration.
//!
//! Purpose
//! -------
//! Bundle the constructor-time configuration of the Cressie-Read estimators:
//! declared weight/reward ranges ([`CrBounds`]), degeneracy and censoring
//! flags, and the critical-value family used for intervals
//! ([`CriticalValue`]), all validated once at construction.
//!
//! Conventions
//! -----------
//! - `wmax = f64::INFINITY` is the "unbounded weights" configuration and
//!   selects the closed-form limit of the fake-point construction.
//! - The batch estimator defaults to the `F(1, n)` critical value; the
//!   online estimator always uses `χ²(1)`.
use crate::cressie_read::{
    errors::{CrError, CrResult},
    validation::{validate_reward_bounds, validate_weight_bounds},
};
use statrs::{
    distribution::{ContinuousCDF, Normal},
    function::beta::inv_beta_reg,
};

/// CrBounds — validated importance-weight and reward ranges.
///
/// Fields
/// ------
/// - `wmin`: `f64` — smallest admissible weight, `0 ≤ wmin < 1`.
/// - `wmax`: `f64` — largest admissible weight, `wmax > 1` (may be `+∞`).
/// - `rmin`, `rmax`: `f64` — finite reward range with `rmin ≤ rmax`.
///
/// Invariants
/// ----------
/// - Enforced by [`CrBounds::new`]; the fields are read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrBounds {
    pub(crate) wmin: f64,
    pub(crate) wmax: f64,
    pub(crate) rmin: f64,
    pub(crate) rmax: f64,
}

impl CrBounds {
    /// Construct validated bounds.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidWeightBounds` unless `0 ≤ wmin < 1 < wmax`.
    /// - `CrError::InvalidRewardBounds` unless `rmin ≤ rmax` are finite.
    pub fn new(wmin: f64, wmax: f64, rmin: f64, rmax: f64) -> CrResult<Self> {
        validate_weight_bounds(wmin, wmax)?;
        validate_reward_bounds(rmin, rmax)?;
        Ok(CrBounds { wmin, wmax, rmin, rmax })
    }

    pub fn wmin(&self) -> f64 {
        self.wmin
    }

    pub fn wmax(&self) -> f64 {
        self.wmax
    }

    pub fn rmin(&self) -> f64 {
        self.rmin
    }

    pub fn rmax(&self) -> f64 {
        self.rmax
    }

    /// Midpoint of the reward range, the point value assigned to missing mass.
    pub(crate) fn reward_mid(&self) -> f64 {
        0.5 * (self.rmin + self.rmax)
    }

    /// Clip `value` into `[rmin, rmax]`.
    pub(crate) fn clip_reward(&self, value: f64) -> f64 {
        value.clamp(self.rmin, self.rmax)
    }
}

impl Default for CrBounds {
    /// `w ∈ [0, ∞)`, `r ∈ [0, 1]`.
    fn default() -> Self {
        CrBounds { wmin: 0.0, wmax: f64::INFINITY, rmin: 0.0, rmax: 1.0 }
    }
}

/// CriticalValue — quantile family for the divergence-ball radius `Delta`.
///
/// - `FisherSnedecor`: upper-α quantile of `F(1, n)`; the fixed-sample
///   batch default with its degrees-of-freedom correction.
/// - `ChiSquared`: upper-α quantile of `χ²(1)`; used by the streaming
///   estimator, which has no held-out degrees of freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CriticalValue {
    #[default]
    FisherSnedecor,
    ChiSquared,
}

impl CriticalValue {
    /// Upper-`alpha` quantile for a sample of (possibly fractional) size `n`.
    ///
    /// Both families go through functions accurate to near machine
    /// precision rather than the generic bracketing `inverse_cdf`:
    /// - `χ²(1)`: the square of the two-sided standard normal quantile,
    ///   `z_{1−α/2}²`.
    /// - `F(1, n)`: `n·x/(1 − x)` with `x` the `1 − α` quantile of
    ///   `Beta(1/2, n/2)`, since `X ~ F(1, n)` gives `X/(X + n) ~ Beta(1/2, n/2)`.
    ///
    /// Errors
    /// ------
    /// - `CrError::Distribution` when the degrees of freedom `n` are not
    ///   finite and positive (F family only).
    pub fn quantile(&self, alpha: f64, n: f64) -> CrResult<f64> {
        let q = match self {
            CriticalValue::FisherSnedecor => {
                if !(n.is_finite() && n > 0.0) {
                    return Err(CrError::Distribution {
                        reason: format!("F(1, n) requires finite n > 0, got {n}"),
                    });
                }
                let x = inv_beta_reg(0.5, n / 2.0, 1.0 - alpha);
                n * x / (1.0 - x)
            }
            CriticalValue::ChiSquared => Normal::standard().inverse_cdf(1.0 - alpha / 2.0).powi(2),
        };
        Ok(q)
    }
}

/// CrOptions — solver configuration for [`CrMinusTwo`](crate::cressie_read::CrMinusTwo).
///
/// Fields
/// ------
/// - `bounds`: [`CrBounds`] — declared ranges.
/// - `raise_on_err`: `bool` — escalate numerical degeneracy to `CrError`
///   instead of degrading to a trivial bound.
/// - `censored`: `bool` — admit missing rewards and switch the point
///   estimate to the censored ratio.
/// - `critical`: [`CriticalValue`] — quantile family for intervals.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrOptions {
    pub bounds: CrBounds,
    pub raise_on_err: bool,
    pub censored: bool,
    pub critical: CriticalValue,
}

impl CrOptions {
    /// Options with the given bounds and default flags
    /// (`raise_on_err = false`, `censored = false`, `F(1, n)` quantiles).
    pub fn new(bounds: CrBounds) -> Self {
        CrOptions { bounds, ..CrOptions::default() }
    }

    pub fn with_raise_on_err(mut self, raise_on_err: bool) -> Self {
        self.raise_on_err = raise_on_err;
        self
    }

    pub fn with_censored(mut self, censored: bool) -> Self {
        self.censored = censored;
        self
    }

    pub fn with_critical_value(mut self, critical: CriticalValue) -> Self {
        self.critical = critical;
        self
    }
}
