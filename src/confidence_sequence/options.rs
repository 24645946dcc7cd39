//! confidence_sequence::options — configuration of the betting sequences.
//!
//! Purpose
//! -------
//! Validated constructor parameters for the continuous-mixture sequence
//! ([`AnytimeOptions`]) and the countable-mixture sequence
//! ([`RobustMixtureOptions`]).
//!
//! Conventions
//! -----------
//! - Defaults: `eta = 1.1`, `s = 1.1`, rewards in `[0, 1]`, `adjust = false`;
//!   `k = 1.5`, `xi = 1.6`, `lambda_max = 0.5`.
use crate::confidence_sequence::{
    errors::{CsError, CsResult},
    validation::validate_reward_bounds,
};

/// AnytimeOptions — parameters of the continuous betting mixture.
///
/// Fields
/// ------
/// - `rmin`, `rmax`: reward range mapped onto `[0, 1]`.
/// - `adjust`: widen `rmin`/`rmax` to the observed range instead of
///   rejecting out-of-range rewards. The coverage guarantee then no longer
///   refers to a range fixed in advance.
/// - `eta`: geometric spacing of the stitched epochs (`> 1`).
/// - `s`: tail index of the epoch prior (`> 1`), normalized by `ζ(s)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnytimeOptions {
    pub(crate) rmin: f64,
    pub(crate) rmax: f64,
    pub(crate) adjust: bool,
    pub(crate) eta: f64,
    pub(crate) s: f64,
}

impl AnytimeOptions {
    /// Errors
    /// ------
    /// - `CsError::InvalidRewardBounds`, `CsError::InvalidEta`,
    ///   `CsError::InvalidTailIndex`.
    pub fn new(rmin: f64, rmax: f64, adjust: bool, eta: f64, s: f64) -> CsResult<Self> {
        validate_reward_bounds(rmin, rmax)?;
        if !(eta.is_finite() && eta > 1.0) {
            return Err(CsError::InvalidEta { eta });
        }
        if !(s.is_finite() && s > 1.0) {
            return Err(CsError::InvalidTailIndex { s });
        }
        Ok(AnytimeOptions { rmin, rmax, adjust, eta, s })
    }

    /// Default spread and tail index over the reward range `[rmin, rmax]`.
    pub fn with_reward_range(rmin: f64, rmax: f64) -> CsResult<Self> {
        AnytimeOptions::new(rmin, rmax, false, 1.1, 1.1)
    }
}

impl Default for AnytimeOptions {
    fn default() -> Self {
        AnytimeOptions { rmin: 0.0, rmax: 1.0, adjust: false, eta: 1.1, s: 1.1 }
    }
}

/// RobustMixtureOptions — parameters of the countable betting mixture.
///
/// Fields
/// ------
/// - `k`: histogram base for large residuals, `k ∈ (1, 2)`.
/// - `xi`: geometric rate of the betting-fraction grid and its weights.
/// - `lambda_max`: largest betting fraction, in `(0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustMixtureOptions {
    pub(crate) k: f64,
    pub(crate) xi: f64,
    pub(crate) lambda_max: f64,
}

impl RobustMixtureOptions {
    /// Errors
    /// ------
    /// - `CsError::InvalidHistogramBase`, `CsError::InvalidMixtureRate`,
    ///   `CsError::InvalidLambdaMax`.
    pub fn new(k: f64, xi: f64, lambda_max: f64) -> CsResult<Self> {
        if !(k > 1.0 && k < 2.0) {
            return Err(CsError::InvalidHistogramBase { k });
        }
        if !(xi.is_finite() && xi > 1.0) {
            return Err(CsError::InvalidMixtureRate { xi });
        }
        if !(lambda_max > 0.0 && lambda_max < 1.0) {
            return Err(CsError::InvalidLambdaMax { lambda_max });
        }
        Ok(RobustMixtureOptions { k, xi, lambda_max })
    }

    pub fn k(&self) -> f64 {
        self.k
    }
}

impl Default for RobustMixtureOptions {
    fn default() -> Self {
        RobustMixtureOptions { k: 1.5, xi: 1.6, lambda_max: 0.5 }
    }
}
