//! cressie_read::validation — contract checks for bounds and observations.
//!
//! Purpose
//! -------
//! Centralize the input guards of the Cressie-Read estimators so the batch
//! solver, the accumulators, and the online wrapper reject malformed
//! configuration and observations with identical error semantics.
//!
//! Key behaviors
//! -------------
//! - [`validate_weight_bounds`]: `0 ≤ wmin < 1 < wmax` (`wmax` may be `+∞`).
//! - [`validate_reward_bounds`]: finite `rmin ≤ rmax`.
//! - [`validate_alpha`], [`validate_decay`]: open/half-open unit ranges.
//! - [`validate_sample_size`]: finite `n > 0`.
//! - [`validate_observation`]: count, weight range, and reward range
//!   (missing rewards only in censored mode).
//!
//! Invariants & assumptions
//! ------------------------
//! - Every helper is side-effect free and returns [`CrResult`]; none of
//!   them panic.
use crate::cressie_read::{
    errors::{CrError, CrResult},
    options::CrBounds,
};

/// Check `0 ≤ wmin < 1 < wmax`, with `wmin` finite and `wmax` possibly `+∞`.
pub fn validate_weight_bounds(wmin: f64, wmax: f64) -> CrResult<()> {
    if !wmin.is_finite() || wmin < 0.0 || wmin >= 1.0 {
        return Err(CrError::InvalidWeightBounds {
            wmin,
            wmax,
            reason: "wmin must be finite and lie in [0, 1).",
        });
    }
    if wmax.is_nan() || wmax <= 1.0 {
        return Err(CrError::InvalidWeightBounds {
            wmin,
            wmax,
            reason: "wmax must exceed 1 (it may be +inf).",
        });
    }
    Ok(())
}

/// Check that reward bounds are finite and ordered.
pub fn validate_reward_bounds(rmin: f64, rmax: f64) -> CrResult<()> {
    if !rmin.is_finite() || !rmax.is_finite() {
        return Err(CrError::InvalidRewardBounds {
            rmin,
            rmax,
            reason: "reward bounds must be finite.",
        });
    }
    if rmin > rmax {
        return Err(CrError::InvalidRewardBounds { rmin, rmax, reason: "rmin must not exceed rmax." });
    }
    Ok(())
}

/// Check `alpha ∈ (0, 1)`.
pub fn validate_alpha(alpha: f64) -> CrResult<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(CrError::InvalidAlpha { alpha });
    }
    Ok(())
}

/// Check `tau ∈ (0, 1]`.
pub fn validate_decay(tau: f64) -> CrResult<()> {
    if !(tau > 0.0 && tau <= 1.0) {
        return Err(CrError::InvalidDecay { tau });
    }
    Ok(())
}

/// Check that the (possibly decayed) sample count is finite and positive.
pub fn validate_sample_size(n: f64) -> CrResult<()> {
    if !(n.is_finite() && n > 0.0) {
        return Err(CrError::InvalidSampleSize { n });
    }
    Ok(())
}

/// Check a single `(count, weight, reward)` observation against `bounds`.
///
/// Parameters
/// ----------
/// - `count`: `f64`
///   Replicate count; must be finite and `≥ 0`.
/// - `weight`: `f64`
///   Importance weight; must lie in `[wmin, wmax]`.
/// - `reward`: `Option<f64>`
///   Observed reward in `[rmin, rmax]`, or `None` when censored.
/// - `bounds`: `&CrBounds`
///   Declared ranges.
/// - `censored`: `bool`
///   Whether missing rewards are admissible.
///
/// Errors
/// ------
/// - `CrError::InvalidCount`, `CrError::WeightOutOfRange`,
///   `CrError::RewardOutOfRange`, `CrError::MissingReward`.
pub fn validate_observation(
    count: f64, weight: f64, reward: Option<f64>, bounds: &CrBounds, censored: bool,
) -> CrResult<()> {
    if !count.is_finite() || count < 0.0 {
        return Err(CrError::InvalidCount { count });
    }
    if !(weight >= bounds.wmin && weight <= bounds.wmax) || weight.is_infinite() {
        return Err(CrError::WeightOutOfRange { weight, wmin: bounds.wmin, wmax: bounds.wmax });
    }
    match reward {
        Some(r) if !(r >= bounds.rmin && r <= bounds.rmax) => {
            Err(CrError::RewardOutOfRange { reward: r, rmin: bounds.rmin, rmax: bounds.rmax })
        }
        None if !censored => Err(CrError::MissingReward),
        _ => Ok(()),
    }
}
