//! confidence_sequence::g_tilde — compressed variance proxy for heavy tails.
//!
//! Purpose
//! -------
//! Upper-bound the cumulative log-wealth shortfall `Σ g(λ·e_i)`, with
//! `g(y) = y − ln(1 + y)` and centered residuals `e_i = x_i − x̂_i`, at any
//! betting fraction `λ ∈ (0, 1)` without storing the raw stream.
//!
//! Key behaviors
//! -------------
//! - Residuals in `[−1, 0]` are bounded with Fan's inequality through
//!   `Σe²` (`sum_low_v`), residuals in `(0, 1]` with `g(y) ≤ y²/2`
//!   (`sum_mid_v`).
//! - Larger residuals are counted in a histogram keyed by
//!   `j = ⌈log_k e⌉`; each bin is bounded by `g(λ·k^j)` because `g` is
//!   increasing on `y > 0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Observations are finite and `≥ 0`, and `x̂ = min(1, (Σx + ½)/(t + 1))`,
//!   so every residual is `≥ −1`.
use crate::confidence_sequence::{errors::CsResult, validation::validate_nonnegative};
use crate::numerics::{IncrementalSum, fan_penalty, log_gap};
use std::collections::BTreeMap;

/// GTilde — running sum and bucketed residual moments of a non-negative stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GTilde {
    k: f64,
    ln_k: f64,
    t: f64,
    sum_x: IncrementalSum,
    sum_low_v: IncrementalSum,
    sum_mid_v: IncrementalSum,
    sum_v_histo: BTreeMap<i32, f64>,
}

impl GTilde {
    /// Empty tracker with histogram base `k ∈ (1, 2)` (validated by
    /// `RobustMixtureOptions`).
    pub fn new(k: f64) -> Self {
        GTilde {
            k,
            ln_k: k.ln(),
            t: 0.0,
            sum_x: IncrementalSum::new(),
            sum_low_v: IncrementalSum::new(),
            sum_mid_v: IncrementalSum::new(),
            sum_v_histo: BTreeMap::new(),
        }
    }

    /// Fold one observation `x ≥ 0`.
    ///
    /// Errors
    /// ------
    /// - `CsError::InvalidObservation` for negative or non-finite `x`.
    pub fn addobs(&mut self, x: f64) -> CsResult<()> {
        validate_nonnegative(x)?;
        let xhat = ((self.sum_x.value() + 0.5) / (self.t + 1.0)).min(1.0);
        let e = x - xhat;
        if e <= 0.0 {
            self.sum_low_v.add(e * e);
        } else if e <= 1.0 {
            self.sum_mid_v.add(e * e);
        } else {
            let bin = (e.ln() / self.ln_k).ceil() as i32;
            *self.sum_v_histo.entry(bin).or_insert(0.0) += 1.0;
        }
        self.sum_x.add(x);
        self.t += 1.0;
        Ok(())
    }

    /// Upper bound on `Σ g(λ·e_i)` for `λ ∈ (0, 1)`.
    pub fn get_v(&self, lambda: f64) -> f64 {
        let low = fan_penalty(lambda) * self.sum_low_v.value();
        let mid = 0.5 * lambda * lambda * self.sum_mid_v.value();
        let high: f64 = self
            .sum_v_histo
            .iter()
            .map(|(&bin, &count)| count * log_gap(lambda * self.k.powi(bin)))
            .sum();
        low + mid + high
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn sum_x(&self) -> f64 {
        self.sum_x.value()
    }
}
