//! Two-sided interval value shared by every estimator.

/// Interval — closed `[lower, upper]` bound on an estimand.
///
/// Returned by the Cressie-Read interval solvers and by every confidence
/// sequence. Either end may be infinite when the data cannot bound that side
/// (e.g. the mirrored side of a heavy-tailed countable mixture).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower end.
    pub lower: f64,
    /// Upper end.
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Self {
        Interval { lower, upper }
    }

    /// `upper − lower`.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// `true` when `value ∈ [lower, upper]`.
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl From<Interval> for (f64, f64) {
    fn from(interval: Interval) -> (f64, f64) {
        (interval.lower, interval.upper)
    }
}

impl From<(f64, f64)> for Interval {
    fn from((lower, upper): (f64, f64)) -> Interval {
        Interval { lower, upper }
    }
}
