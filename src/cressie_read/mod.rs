//! cressie_read — Cressie-Read (power −2) off-policy estimators.
//!
//! Purpose
//! -------
//! Estimate the value of a target policy from importance-weighted logged
//! rewards and bound it at a fixed sample size, by projecting the empirical
//! distribution onto the reweightings consistent with `E[w] = 1` under a
//! Cressie-Read power −2 divergence. The subtree offers a batch solver over
//! aggregated statistics and a streaming wrapper with forgetting.
//!
//! Key behaviors
//! -------------
//! - [`sufficient_stats`]: validated, compensated accumulation of the
//!   moments of `(w, r)` (and of `(u, w, r)` for two-policy contrasts).
//! - [`batch`]: [`CrMinusTwo`] point estimates, intervals, and contrasts in
//!   closed form.
//! - [`online`]: [`OnlineCressieRead`] with cached per-side duals and the
//!   importance-correction functional `qlb`.
//! - [`dual`]: dual solutions, the [`QFunc`] value object and the
//!   [`DualState`] cache tag.
//!
//! Invariants & assumptions
//! ------------------------
//! - Bounds are validated once in [`CrBounds::new`]; observations are
//!   validated on every accumulation.
//! - Numerical degeneracy yields trivial bounds unless `raise_on_err`.
//!
//! Downstream usage
//! ----------------
//! - Batch: accumulate with [`StatsAccumulator`], then call
//!   [`CrMinusTwo::estimate`] / [`CrMinusTwo::interval`] on its snapshot.
//! - Streaming: call [`OnlineCressieRead::update`] per record and read
//!   `lower_bound` / `upper_bound` / `qlb` whenever needed.
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests; replay equivalence between the online
//!   and batch paths is tested in `online` and in the integration suite.

pub mod batch;
pub mod dual;
pub mod errors;
pub mod online;
pub mod options;
pub mod sufficient_stats;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::batch::CrMinusTwo;
pub use self::dual::{DualSolution, DualState, QFunc, Side, SideSolution};
pub use self::errors::{CrError, CrResult};
pub use self::online::OnlineCressieRead;
pub use self::options::{CrBounds, CrOptions, CriticalValue};
pub use self::sufficient_stats::{
    DiffAccumulator, DiffStatistics, Observation, StatsAccumulator, SufficientStatistics,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::batch::CrMinusTwo;
    pub use super::errors::{CrError, CrResult};
    pub use super::online::OnlineCressieRead;
    pub use super::options::{CrBounds, CrOptions, CriticalValue};
    pub use super::sufficient_stats::{StatsAccumulator, SufficientStatistics};
}
