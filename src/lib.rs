//! ope_estimators — off-policy evaluation estimators and confidence sequences.
//!
//! Purpose
//! -------
//! Turn a stream of `(count, importance weight, reward)` observations logged
//! by a contextual-bandit system into (a) a point estimate of a target
//! policy's expected value and (b) confidence bounds that hold either at a
//! fixed sample size or simultaneously at every sample size.
//!
//! Key behaviors
//! -------------
//! - [`numerics`]: exactly rounded streaming sums, special functions, and
//!   bracket-and-bisect root search shared by every estimator.
//! - [`cressie_read`]: Cressie-Read (power −2) batch and streaming
//!   estimators with closed-form duals, censored rewards, exponential
//!   forgetting, and two-policy contrasts.
//! - [`confidence_sequence`]: anytime-valid betting confidence sequences
//!   (continuous mixture, heavy-tail robust countable mixture, DDRM).
//! - [`interval`]: the two-sided [`Interval`] returned by every estimator.
//!
//! Invariants & assumptions
//! ------------------------
//! - Everything is synchronous and in-memory; estimators are single-writer
//!   values without internal locking.
//! - Configuration is validated once at construction; observations are
//!   validated on every update. Invalid input is reported through the
//!   subtree error types ([`cressie_read::CrError`],
//!   [`confidence_sequence::CsError`]) and never panics.
//!
//! Conventions
//! -----------
//! - Diagnostics are emitted through `tracing` at `debug`/`trace`
//!   (numerical decisions) and `warn` (degraded trivial bounds). The crate
//!   never installs a subscriber.
//!
//! Downstream usage
//! ----------------
//! - Fixed-sample analysis: accumulate a
//!   [`StatsAccumulator`](cressie_read::StatsAccumulator) and query
//!   [`CrMinusTwo`](cressie_read::CrMinusTwo).
//! - Monitoring: feed [`OnlineCressieRead`](cressie_read::OnlineCressieRead)
//!   or one of the confidence sequences record by record.
//!
//! Testing notes
//! -------------
//! - Unit tests live beside each module; `tests/integration_ope_pipeline.rs`
//!   exercises the estimators end to end on seeded streams.

pub mod confidence_sequence;
pub mod cressie_read;
pub mod interval;
pub mod numerics;

pub use crate::interval::Interval;

pub mod prelude {
    pub use crate::confidence_sequence::prelude::*;
    pub use crate::cressie_read::prelude::*;
    pub use crate::interval::Interval;
    pub use crate::numerics::prelude::*;
}
