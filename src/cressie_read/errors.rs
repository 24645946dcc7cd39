//! cressie_read::errors — error type for the Cressie-Read estimators.
//!
//! Purpose
//! -------
//! Provide a single error enum and result alias for the batch and online
//! Cressie-Read (power −2) estimators: bound/option validation, observation
//! contract violations, and the numerical degeneracies that are escalated
//! only when the caller opts into `raise_on_err`.
//!
//! Key behaviors
//! -------------
//! - Define [`CrResult`] and [`CrError`] as the canonical result and error
//!   types for `cressie_read`.
//! - Attach human-readable `Display` messages (via `thiserror`) that embed
//!   the offending value so logs are useful without extra context.
//!
//! Invariants & assumptions
//! ------------------------
//! - Contract violations (invalid bounds, negative counts, out-of-range
//!   weights/rewards, `n ≤ 0`) are always returned as errors; they are never
//!   recovered internally.
//! - Degeneracy variants (`NoObservedMass`, `NoFeasibleBranch`,
//!   `DegenerateWeights`) are only produced when `raise_on_err` is set;
//!   otherwise the solvers degrade to trivial bounds.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of domain constraints
//!   ("wmin must lie in [0, 1)") rather than implementation details.
//!
//! Testing notes
//! -------------
//! - Unit tests check that `Display` output embeds payload values.
use thiserror::Error;

/// Result alias for Cressie-Read operations.
pub type CrResult<T> = Result<T, CrError>;

/// CrError — validation and degeneracy failures of the Cressie-Read estimators.
///
/// Variants
/// --------
/// - Bounds / options: `InvalidWeightBounds`, `InvalidRewardBounds`,
///   `InvalidAlpha`, `InvalidDecay`.
/// - Observations: `InvalidCount`, `WeightOutOfRange`, `RewardOutOfRange`,
///   `MissingReward`, `ColumnLengthMismatch`.
/// - Statistics: `InvalidSampleSize`, `UnboundedWeightsUnsupported`,
///   `IncompatibleDecay`.
/// - Numerical degeneracy (only with `raise_on_err`): `NoObservedMass`,
///   `NoFeasibleBranch`, `DegenerateWeights`.
/// - Backend: `Distribution` reports degrees of freedom no quantile exists for.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrError {
    // ---- Bounds / options ----
    /// Importance-weight bounds violate `0 ≤ wmin < 1 < wmax`.
    #[error("Invalid weight bounds [{wmin}, {wmax}]: {reason}")]
    InvalidWeightBounds { wmin: f64, wmax: f64, reason: &'static str },

    /// Reward bounds must be finite with `rmin ≤ rmax`.
    #[error("Invalid reward bounds [{rmin}, {rmax}]: {reason}")]
    InvalidRewardBounds { rmin: f64, rmax: f64, reason: &'static str },

    /// Significance level must lie in (0, 1).
    #[error("Invalid alpha {alpha}: must lie in the open interval (0, 1).")]
    InvalidAlpha { alpha: f64 },

    /// Decay factor must lie in (0, 1].
    #[error("Invalid decay tau {tau}: must lie in (0, 1].")]
    InvalidDecay { tau: f64 },

    // ---- Observations ----
    /// Replicate counts must be finite and non-negative.
    #[error("Invalid count {count}: must be finite and non-negative.")]
    InvalidCount { count: f64 },

    /// Importance weight outside `[wmin, wmax]`.
    #[error("Weight {weight} outside the declared range [{wmin}, {wmax}].")]
    WeightOutOfRange { weight: f64, wmin: f64, wmax: f64 },

    /// Reward outside `[rmin, rmax]`.
    #[error("Reward {reward} outside the declared range [{rmin}, {rmax}].")]
    RewardOutOfRange { reward: f64, rmin: f64, rmax: f64 },

    /// A missing reward was supplied to an uncensored estimator.
    #[error("Missing reward is only allowed in censored mode.")]
    MissingReward,

    /// Columnar input with inconsistent lengths.
    #[error("Column length mismatch: expected {expected}, found {found}.")]
    ColumnLengthMismatch { expected: usize, found: usize },

    // ---- Statistics ----
    /// The (possibly decayed) sample count must be positive.
    #[error("Invalid sample size n = {n}: must be finite and > 0.")]
    InvalidSampleSize { n: f64 },

    /// The two-policy solver requires a finite `wmax`.
    #[error("Two-policy estimation requires a finite wmax.")]
    UnboundedWeightsUnsupported,

    /// Accumulators with different decay factors cannot be merged.
    #[error("Cannot merge accumulators with decay {left} and {right}.")]
    IncompatibleDecay { left: f64, right: f64 },

    // ---- Numerical degeneracy (raise_on_err) ----
    /// Censored estimate: neither observed nor missing mass is positive.
    #[error("No observed probability mass: the censored ratio is undefined.")]
    NoObservedMass,

    /// Every dual branch of one interval side was infeasible.
    #[error("No feasible dual branch for the {side} bound.")]
    NoFeasibleBranch { side: &'static str },

    /// Augmented weights have (numerically) zero variance.
    #[error("Degenerate weights: augmented variance {variance} is not positive.")]
    DegenerateWeights { variance: f64 },

    // ---- Backend ----
    /// Quantile distribution could not be constructed.
    #[error("Distribution error: {reason}")]
    Distribution { reason: String },
}
