//! confidence_sequence::validation — input guards for the confidence sequences.
//!
//! Free functions returning [`CsResult`]; each checks one parameter family
//! and never panics.
use crate::confidence_sequence::errors::{CsError, CsResult};

/// Check `alpha ∈ (0, 1)`.
pub fn validate_alpha(alpha: f64) -> CsResult<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(CsError::InvalidAlpha { alpha });
    }
    Ok(())
}

/// Check finite, ordered reward bounds.
pub fn validate_reward_bounds(rmin: f64, rmax: f64) -> CsResult<()> {
    if !rmin.is_finite() || !rmax.is_finite() {
        return Err(CsError::InvalidRewardBounds {
            rmin,
            rmax,
            reason: "reward bounds must be finite.",
        });
    }
    if rmin > rmax {
        return Err(CsError::InvalidRewardBounds { rmin, rmax, reason: "rmin must not exceed rmax." });
    }
    Ok(())
}

/// Check finite `w ≥ 0`.
pub fn validate_weight(weight: f64) -> CsResult<()> {
    if !(weight.is_finite() && weight >= 0.0) {
        return Err(CsError::InvalidWeight { weight });
    }
    Ok(())
}

/// Check finite `x ≥ 0`.
pub fn validate_nonnegative(x: f64) -> CsResult<()> {
    if !(x.is_finite() && x >= 0.0) {
        return Err(CsError::InvalidObservation { x });
    }
    Ok(())
}

/// Check `p_drop ∈ [0, 1)` and, when given, finite `n_drop ≥ 0`.
pub fn validate_drop(p_drop: f64, n_drop: Option<f64>) -> CsResult<()> {
    if !(p_drop >= 0.0 && p_drop < 1.0) {
        return Err(CsError::InvalidDropProbability { p_drop });
    }
    if let Some(n_drop) = n_drop {
        if !(n_drop.is_finite() && n_drop >= 0.0) {
            return Err(CsError::InvalidDropCount { n_drop });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Each rejection branch of the confidence-sequence validators.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Ensure invalid parameters map to their variants and valid ones pass.
    //
    // Given
    // -----
    // - alpha = 1, rmin > rmax, w = -1, x = NaN, p_drop = 1, n_drop = -2.
    //
    // Expect
    // ------
    // - Matching `CsError` variants; boundary-valid inputs are accepted.
    fn validators_reject_out_of_domain_inputs() {
        assert!(matches!(validate_alpha(1.0), Err(CsError::InvalidAlpha { .. })));
        assert!(matches!(
            validate_reward_bounds(2.0, 1.0),
            Err(CsError::InvalidRewardBounds { .. })
        ));
        assert!(matches!(validate_weight(-1.0), Err(CsError::InvalidWeight { .. })));
        assert!(matches!(validate_nonnegative(f64::NAN), Err(CsError::InvalidObservation { .. })));
        assert!(matches!(validate_drop(1.0, None), Err(CsError::InvalidDropProbability { .. })));
        assert!(matches!(validate_drop(0.5, Some(-2.0)), Err(CsError::InvalidDropCount { .. })));

        assert!(validate_weight(0.0).is_ok());
        assert!(validate_drop(0.0, Some(0.0)).is_ok());
        assert!(validate_reward_bounds(1.0, 1.0).is_ok());
    }
}
