//! numerics — compensated sums, special functions, and root search.
//!
//! Purpose
//! -------
//! Collect the numerically delicate primitives shared by the Cressie-Read
//! estimators and the betting confidence sequences, so the estimator code
//! can assume exactly rounded running moments and stable log-domain
//! arithmetic.
//!
//! Key behaviors
//! -------------
//! - [`IncrementalSum`]: exactly rounded streaming summation with merge and
//!   scaling, the foundation for every running moment in the crate.
//! - [`special`]: trigamma, Riemann zeta, log-sum-exp, and the two
//!   log-wealth penalty functions (`fan_penalty`, `log_gap`).
//! - [`root`]: monotone bracket-and-bisect boundary search with a bounded
//!   number of iterations.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything here is pure and allocation-light; no logging or I/O.
//! - Domain checks (e.g. `s > 1` for ζ) return `NaN` rather than erroring;
//!   estimator-level validation rejects invalid configuration first.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests against closed forms and the
//!   cancellation cases that motivate compensated summation.

pub mod incremental_sum;
pub mod root;
pub mod special;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::incremental_sum::IncrementalSum;
pub use self::root::{BISECTION_MAX_ITER, BISECTION_TOL, bisect_boundary};
pub use self::special::{fan_penalty, log_add_exp, log_gap, riemann_zeta, trigamma};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::incremental_sum::IncrementalSum;
}
