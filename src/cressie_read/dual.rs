//! cressie_read::dual — Lagrange multipliers of the one-sided bound problem.
//!
//! Purpose
//! -------
//! Represent the optimum of the Cressie-Read (power −2) interval problem as
//! plain values: the multipliers `(gammastar, betastar, kappastar)`, the
//! fake weight that produced them, and the induced reweighting functional
//! [`QFunc`]. The online estimator caches these per side in a [`DualState`].
//!
//! Key behaviors
//! -------------
//! - [`Side`] names the lower (`rmin`, sign `+1`) and upper (`rmax`,
//!   sign `−1`) problems.
//! - [`QFunc::evaluate`] maps a hypothetical `(w, r)` to its reweighting
//!   `q = 1 − (sign·w·r + β·w + γ)/κ`, or `1` when `κ ≈ 0`.
//! - [`DualState`] is an explicit `Unset | Computed` cache tag.
//!
//! Invariants & assumptions
//! ------------------------
//! - A `DualSolution` is immutable once built; invalidation replaces the
//!   whole [`DualState`].
use crate::cressie_read::options::CrBounds;

/// Multiplier magnitude below which the dual is treated as degenerate and
/// the reweighting collapses to the identity.
pub const KAPPA_EPS: f64 = 1e-12;

/// Side — which end of the interval is being solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Lower,
    Upper,
}

impl Side {
    /// `+1` for the lower bound (minimize), `−1` for the upper bound.
    pub fn sign(&self) -> f64 {
        match self {
            Side::Lower => 1.0,
            Side::Upper => -1.0,
        }
    }

    /// Worst-case reward of this side: `rmin` for the lower bound, `rmax`
    /// for the upper bound. Also the trivial bound of the side.
    pub fn reward(&self, bounds: &CrBounds) -> f64 {
        match self {
            Side::Lower => bounds.rmin,
            Side::Upper => bounds.rmax,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Side::Lower => "lower",
            Side::Upper => "upper",
        }
    }
}

/// QFunc — reweighting functional of a solved dual.
///
/// Holds the captured multipliers; `evaluate` is pure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QFunc {
    pub sign: f64,
    pub beta: f64,
    pub gamma: f64,
    pub kappa: f64,
}

impl QFunc {
    /// Reweighting of a hypothetical observation `(w, r)`.
    pub fn evaluate(&self, w: f64, r: f64) -> f64 {
        if self.kappa.abs() < KAPPA_EPS {
            return 1.0;
        }
        1.0 - (self.sign * w * r + self.beta * w + self.gamma) / self.kappa
    }
}

/// DualSolution — optimum of one side of the interval problem.
///
/// Fields
/// ------
/// - `gammastar`, `betastar`: multipliers of the normalization and
///   weight-mean constraints.
/// - `kappastar`: multiplier of the divergence constraint.
/// - `wfake`: fake weight of the winning branch (may be `+∞`).
/// - `qfunc`: induced reweighting functional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualSolution {
    pub gammastar: f64,
    pub betastar: f64,
    pub kappastar: f64,
    pub wfake: f64,
    pub qfunc: QFunc,
}

impl DualSolution {
    pub fn new(sign: f64, gammastar: f64, betastar: f64, kappastar: f64, wfake: f64) -> Self {
        DualSolution {
            gammastar,
            betastar,
            kappastar,
            wfake,
            qfunc: QFunc { sign, beta: betastar, gamma: gammastar, kappa: kappastar },
        }
    }
}

/// SideSolution — clipped bound of one side plus its dual.
///
/// `dual` is `None` when the side fell back to its trivial bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideSolution {
    pub bound: f64,
    pub dual: Option<DualSolution>,
}

/// DualState — cached one-sided solution of the online estimator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DualState {
    #[default]
    Unset,
    Computed(SideSolution),
}

impl DualState {
    pub fn is_unset(&self) -> bool {
        matches!(self, DualState::Unset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Verify the reweighting formula and its degenerate fallback.
    //
    // Given
    // -----
    // - sign = 1, beta = -1, gamma = 0.5, kappa = 2; a zero-kappa copy.
    //
    // Expect
    // ------
    // - q(2, 1) = 1 − (2 − 2 + 0.5)/2 = 0.75; the degenerate copy returns 1.
    fn qfunc_evaluates_and_degrades_to_identity() {
        // Arrange
        let dual = DualSolution::new(1.0, 0.5, -1.0, 2.0, 10.0);
        let flat = DualSolution::new(1.0, 0.5, -1.0, 0.0, 10.0);

        // Act & Assert
        assert_relative_eq!(dual.qfunc.evaluate(2.0, 1.0), 0.75);
        assert_eq!(flat.qfunc.evaluate(2.0, 1.0), 1.0);
        assert!(DualState::default().is_unset());
        assert_eq!(Side::Upper.sign(), -1.0);
    }
}
