//! confidence_sequence::errors — error type for the betting confidence sequences.
//!
//! Purpose
//! -------
//! Provide a single error enum and result alias for the anytime-valid
//! confidence sequences (continuous mixture, countable mixture, DDRM).
//! Every variant is a contract violation detected at the boundary; the
//! sequences themselves have no recoverable numerical failure modes.
//!
//! Conventions
//! -----------
//! - Variants carry the offending value; bound-style variants add a
//!   `&'static str` reason.
use thiserror::Error;

/// Result alias for confidence-sequence operations.
pub type CsResult<T> = Result<T, CsError>;

/// CsError — configuration and observation failures of the confidence
/// sequences.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CsError {
    // ---- Configuration ----
    /// Significance level must lie in (0, 1).
    #[error("Invalid alpha {alpha}: must lie in the open interval (0, 1).")]
    InvalidAlpha { alpha: f64 },

    /// Reward bounds must be finite with `rmin ≤ rmax`.
    #[error("Invalid reward bounds [{rmin}, {rmax}]: {reason}")]
    InvalidRewardBounds { rmin: f64, rmax: f64, reason: &'static str },

    /// Mixture spread must exceed 1.
    #[error("Invalid mixture spread eta {eta}: must be finite and > 1.")]
    InvalidEta { eta: f64 },

    /// Tail index of the epoch prior must exceed 1.
    #[error("Invalid tail index s {s}: must be finite and > 1.")]
    InvalidTailIndex { s: f64 },

    /// Histogram base must lie in (1, 2).
    #[error("Invalid histogram base k {k}: must lie in (1, 2).")]
    InvalidHistogramBase { k: f64 },

    /// Geometric mixture rate must exceed 1.
    #[error("Invalid mixture rate xi {xi}: must be finite and > 1.")]
    InvalidMixtureRate { xi: f64 },

    /// Largest betting fraction must lie in (0, 1).
    #[error("Invalid lambda_max {lambda_max}: must lie in (0, 1).")]
    InvalidLambdaMax { lambda_max: f64 },

    // ---- Observations ----
    /// Importance weights must be finite and non-negative.
    #[error("Invalid weight {weight}: must be finite and non-negative.")]
    InvalidWeight { weight: f64 },

    /// Reward outside the configured range.
    #[error("Reward {reward} outside the range [{rmin}, {rmax}].")]
    RewardOutOfRange { reward: f64, rmin: f64, rmax: f64 },

    /// Mixture observations must be finite and non-negative.
    #[error("Invalid observation {x}: must be finite and non-negative.")]
    InvalidObservation { x: f64 },

    /// Drop probability must lie in [0, 1).
    #[error("Invalid drop probability {p_drop}: must lie in [0, 1).")]
    InvalidDropProbability { p_drop: f64 },

    /// Number of dropped observations must be finite and non-negative.
    #[error("Invalid drop count {n_drop}: must be finite and non-negative.")]
    InvalidDropCount { n_drop: f64 },
}
