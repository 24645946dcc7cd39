//! Monotone bracket-and-bisect boundary search.
//!
//! The confidence-sequence solvers need the point where a monotone
//! decision ("this candidate mean is rejected") flips from `true` to
//! `false`. The decision is evaluated exactly (the lazy mixture sums
//! resolve against the threshold), so plain bisection on the predicate is
//! both sufficient and terminating once the bracket is established.

/// Absolute width at which [`bisect_boundary`] stops.
pub const BISECTION_TOL: f64 = 1e-12;

/// Hard cap on bisection steps; 64 halvings exhaust `f64` resolution on
/// any finite bracket.
pub const BISECTION_MAX_ITER: usize = 64;

/// Locate the boundary of a monotone predicate on `[lo, hi]`.
///
/// Parameters
/// ----------
/// - `lo`, `hi`: `f64`
///   Bracket with `lo < hi`. The caller must have established
///   `pred(lo) == true` and `pred(hi) == false`.
/// - `tol`: `f64`
///   Stop once `hi − lo ≤ tol`.
/// - `max_iter`: `usize`
///   Upper bound on predicate evaluations.
/// - `pred`: `FnMut(f64) -> bool`
///   Monotone: `true` on `[lo, root)`, `false` on `(root, hi]`.
///
/// Returns
/// -------
/// `(f64, f64)`
///   Final bracket `(lo, hi)`; `pred(lo)` is still `true` and `pred(hi)` is
///   still `false`. Callers that need a conservative answer pick the side
///   that keeps their guarantee.
pub fn bisect_boundary<F>(
    mut lo: f64, mut hi: f64, tol: f64, max_iter: usize, mut pred: F,
) -> (f64, f64)
where
    F: FnMut(f64) -> bool,
{
    for _ in 0..max_iter {
        if hi - lo <= tol {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if mid <= lo || mid >= hi {
            break;
        }
        if pred(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo, hi)
}
