//! confidence_sequence — anytime-valid betting confidence sequences.
//!
//! Purpose
//! -------
//! Provide intervals for a policy value that hold simultaneously at every
//! sample size, so a monitor may look after each observation and stop
//! whenever it likes. All constructions view inference as betting: a
//! candidate mean is rejected once a fictitious gambler's wealth against it
//! exceeds `1/alpha`.
//!
//! Key behaviors
//! -------------
//! - [`anytime`]: [`AnytimeConfidenceSequence`], a continuous mixture of
//!   betting fractions with a closed-form stitched boundary; supports
//!   simulated dropped observations.
//! - [`g_tilde`]: [`GTilde`], a histogram-compressed bound on the
//!   log-wealth shortfall for heavy-tailed streams.
//! - [`robust_mixture`]: [`RobustMixture`], a countable mixture solved by
//!   lazy log-sum-exp and bisection.
//! - [`ddrm`]: [`Ddrm`], two mixtures combined into an interval for a
//!   reward-weighted value.
//!
//! Invariants & assumptions
//! ------------------------
//! - State changes only through `addobs`; `getci` is read-only.
//! - Every query terminates: bisection runs on an established bracket and
//!   mixtures are capped at [`MAX_MIXTURE_TERMS`] terms.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each construction; the integration suite
//!   exercises the sequences on seeded streams.

pub mod anytime;
pub mod ddrm;
pub mod errors;
pub mod g_tilde;
pub mod options;
pub mod robust_mixture;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::anytime::AnytimeConfidenceSequence;
pub use self::ddrm::Ddrm;
pub use self::errors::{CsError, CsResult};
pub use self::g_tilde::GTilde;
pub use self::options::{AnytimeOptions, RobustMixtureOptions};
pub use self::robust_mixture::{MAX_MIXTURE_TERMS, RobustMixture};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::anytime::AnytimeConfidenceSequence;
    pub use super::ddrm::Ddrm;
    pub use super::errors::{CsError, CsResult};
    pub use super::options::{AnytimeOptions, RobustMixtureOptions};
    pub use super::robust_mixture::RobustMixture;
}
