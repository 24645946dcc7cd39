//! cressie_read::batch — the Cressie-Read (power −2) batch estimator.
//!
//! Purpose
//! -------
//! Solve the empirical-likelihood style projection of the observed sample
//! onto the set of reweightings whose importance weights average to one,
//! with a χ²-type divergence (Cressie-Read power −2). The solution yields a
//! point estimate of the target policy's value and, through the dual of the
//! divergence-ball problem, one- and two-sided confidence bounds. Every
//! multiplier is available in closed form, so no iterative optimizer runs.
//!
//! Key behaviors
//! -------------
//! - A single synthetic "fake" observation completes the sample: it sits at
//!   `wmax` when the observed weight mass under-covers `n` (`sumw < n`) and
//!   at `wmin` otherwise. `wmax = +∞` selects the closed-form limit.
//! - [`CrMinusTwo::estimate`] returns the reweighted mean, crediting the
//!   missing probability mass at the reward midpoint; in censored mode it
//!   bounds the observed-reward ratio instead.
//! - [`CrMinusTwo::interval`] solves each side over both fake weights,
//!   drops infeasible branches and keeps the most adversarial candidate.
//! - [`CrMinusTwo::estimate_diff`] / [`CrMinusTwo::interval_diff`] handle
//!   the two-policy contrast `E[(w − u)·r]` with a 3×3 (resp. 2×2)
//!   pseudo-inverse in place of the scalar closed forms.
//!
//! Invariants & assumptions
//! ------------------------
//! - Results are clipped to `[rmin, rmax]` (or `[rmin − rmax, rmax − rmin]`
//!   for contrasts).
//! - Raising `alpha` never widens an interval: the divergence radius only
//!   shrinks, which can only tighten or remove branches.
//! - Contract violations (`n ≤ 0`, `alpha ∉ (0, 1)`) are always errors;
//!   numerical degeneracy returns a trivial answer unless `raise_on_err`.
//!
//! Conventions
//! -----------
//! - `N = n + 1` is the augmented sample size; bars denote `1/N`-means over
//!   the augmented sample.
//! - `sign = +1` for the lower side (worst reward `rmin`), `−1` for the
//!   upper side (worst reward `rmax`).
//!
//! Testing notes
//! -------------
//! - Unit tests cover the equal-weights scenario (estimate equals the plain
//!   mean), interval ordering and alpha monotonicity on seeded streams, the
//!   unbounded-weight limit, censored "no mass", and two-policy contrasts.
use crate::cressie_read::{
    dual::{DualSolution, Side, SideSolution},
    errors::{CrError, CrResult},
    options::{CrBounds, CrOptions},
    sufficient_stats::{DiffStatistics, SufficientStatistics},
    validation::{validate_alpha, validate_sample_size},
};
use crate::interval::Interval;
use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use tracing::{debug, trace, warn};

/// `|y·z|` below which the branch curvature is treated as exactly zero.
const YZ_EPS: f64 = 1e-9;

/// Singular-value cutoff for the least-squares pseudo-inverses.
const PINV_EPS: f64 = 1e-12;

/// CrMinusTwo — Cressie-Read power −2 estimator over aggregated statistics.
///
/// Fields
/// ------
/// - `options`: [`CrOptions`] — bounds, flags and critical-value family.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CrMinusTwo {
    options: CrOptions,
}

impl CrMinusTwo {
    pub fn new(options: CrOptions) -> Self {
        CrMinusTwo { options }
    }

    pub fn options(&self) -> &CrOptions {
        &self.options
    }

    /// Point estimate of the target policy value.
    ///
    /// Parameters
    /// ----------
    /// - `stats`: `&SufficientStatistics`
    ///   Aggregated moments with `n > 0`.
    ///
    /// Returns
    /// -------
    /// `CrResult<Option<f64>>`
    ///   - `Some(v)` with `v ∈ [rmin, rmax]`.
    ///   - `None` only in censored mode, when neither observed nor missing
    ///     mass is positive.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidSampleSize` if `n ≤ 0`.
    /// - `CrError::DegenerateWeights` / `CrError::NoObservedMass` when
    ///   `raise_on_err` is set and the corresponding degeneracy occurs.
    pub fn estimate(&self, stats: &SufficientStatistics) -> CrResult<Option<f64>> {
        validate_sample_size(stats.n)?;
        let bounds = &self.options.bounds;
        let n = stats.n;
        let big_n = n + 1.0;
        let wfake = fake_weight(stats.sumw, n, bounds);

        let (gammastar, betastar) = if wfake.is_infinite() {
            (-big_n / n, 0.0)
        } else {
            let a = (wfake + stats.sumw) / big_n;
            let b = (wfake * wfake + stats.sumwsq) / big_n;
            let denom = a * a - b;
            if denom >= 0.0 {
                if self.options.raise_on_err {
                    return Err(CrError::DegenerateWeights { variance: -denom });
                }
                warn!(a, b, "degenerate augmented weights; returning reward midpoint");
                return Ok(Some(bounds.reward_mid()));
            }
            ((b - a) / denom, (1.0 - a) / denom)
        };

        let vhat = (-gammastar * stats.sumwr - betastar * stats.sumwsqr) / big_n;
        let covered = (-gammastar * stats.sumw - betastar * stats.sumwsq) / big_n;
        let missing = (1.0 - covered).max(0.0);
        debug!(wfake, gammastar, betastar, vhat, missing, "cressie-read point estimate");

        if !self.options.censored {
            return Ok(Some(bounds.clip_reward(vhat + missing * bounds.reward_mid())));
        }

        let observed = (-gammastar * stats.sumwany - betastar * stats.sumwsqany) / big_n;
        let mut candidates = Vec::with_capacity(2);
        if observed > 0.0 {
            candidates.push(vhat / observed);
        }
        if observed + missing > 0.0 {
            candidates.push((vhat + missing * bounds.reward_mid()) / (observed + missing));
        }
        if candidates.is_empty() {
            if self.options.raise_on_err {
                return Err(CrError::NoObservedMass);
            }
            return Ok(None);
        }
        let mean = candidates.iter().sum::<f64>() / candidates.len() as f64;
        Ok(Some(bounds.clip_reward(mean)))
    }

    /// Two-sided confidence interval at level `1 − alpha`.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidAlpha`, `CrError::InvalidSampleSize`.
    /// - `CrError::NoFeasibleBranch` with `raise_on_err` when a side has no
    ///   feasible branch.
    pub fn interval(&self, stats: &SufficientStatistics, alpha: f64) -> CrResult<Interval> {
        let lower = self.solve_side(stats, alpha, Side::Lower)?;
        let upper = self.solve_side(stats, alpha, Side::Upper)?;
        Ok(Interval::new(lower.bound, upper.bound))
    }

    /// Solve one side of the interval problem and return its bound and dual.
    ///
    /// Missing rewards are imputed at the side's worst case before solving.
    /// Each fake weight in `{wmin, wmax}` is a branch; infeasible branches
    /// (`z > 0` or `y·z < 0`) are dropped and the smallest signed candidate
    /// wins.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidAlpha`, `CrError::InvalidSampleSize`,
    ///   `CrError::Distribution`.
    /// - `CrError::NoFeasibleBranch` with `raise_on_err`.
    pub fn solve_side(
        &self, stats: &SufficientStatistics, alpha: f64, side: Side,
    ) -> CrResult<SideSolution> {
        validate_alpha(alpha)?;
        validate_sample_size(stats.n)?;
        let bounds = &self.options.bounds;
        let n = stats.n;
        let big_n = n + 1.0;

        let delta = self.options.critical.quantile(alpha, n)?;
        let phi = (-unconstrained_gstar(stats, bounds) - delta) / (2.0 * big_n);
        let filled = stats.imputed(side.reward(bounds));

        let mut best: Option<(f64, DualSolution)> = None;
        for wfake in [bounds.wmin, bounds.wmax] {
            let branch = if wfake.is_infinite() {
                unbounded_branch(&filled, side, bounds, phi)
            } else {
                bounded_branch(&filled, side, bounds, phi, wfake)
            };
            match branch {
                Some((gstar, dual)) => {
                    if best.is_none_or(|(g, _)| gstar < g) {
                        best = Some((gstar, dual));
                    }
                }
                None => trace!(side = side.label(), wfake, "infeasible dual branch dropped"),
            }
        }

        match best {
            Some((gstar, dual)) => {
                let bound = bounds.clip_reward(side.sign() * gstar);
                debug!(side = side.label(), bound, kappa = dual.kappastar, "cressie-read bound");
                Ok(SideSolution { bound, dual: Some(dual) })
            }
            None if self.options.raise_on_err => {
                Err(CrError::NoFeasibleBranch { side: side.label() })
            }
            None => {
                warn!(side = side.label(), "no feasible dual branch; using trivial bound");
                Ok(SideSolution { bound: side.reward(bounds), dual: None })
            }
        }
    }

    /// Point estimate of the contrast `E[(w − u)·r]` between two policies.
    ///
    /// Solves `M·(γ, β, τ) = −1` where `M` is the second-moment matrix of
    /// `(1, w, u)` over the fake-augmented sample; each weight stream picks
    /// its own fake point with the usual coverage rule.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidSampleSize` if `n ≤ 0`.
    /// - `CrError::UnboundedWeightsUnsupported` if `wmax = +∞`.
    /// - `CrError::DegenerateWeights` with `raise_on_err` when the system is
    ///   not solvable.
    pub fn estimate_diff(&self, stats: &DiffStatistics) -> CrResult<f64> {
        validate_sample_size(stats.n)?;
        let bounds = &self.options.bounds;
        if bounds.wmax.is_infinite() {
            return Err(CrError::UnboundedWeightsUnsupported);
        }
        let n = stats.n;
        let big_n = n + 1.0;
        let wf = fake_weight(stats.sumw, n, bounds);
        let uf = fake_weight(stats.sumu, n, bounds);

        let ew = (stats.sumw + wf) / big_n;
        let eu = (stats.sumu + uf) / big_n;
        let eww = (stats.sumwsq + wf * wf) / big_n;
        let euu = (stats.sumusq + uf * uf) / big_n;
        let euw = (stats.sumuw + uf * wf) / big_n;
        let m = Matrix3::new(1.0, ew, eu, ew, eww, euw, eu, euw, euu);

        let pinv = match m.pseudo_inverse(PINV_EPS) {
            Ok(p) => p,
            Err(reason) if self.options.raise_on_err => {
                debug!(reason, "contrast system pseudo-inverse failed");
                return Err(CrError::DegenerateWeights { variance: eww - ew * ew });
            }
            Err(reason) => {
                warn!(reason, "contrast system pseudo-inverse failed; returning 0");
                return Ok(0.0);
            }
        };
        let sol = pinv * Vector3::new(-1.0, -1.0, -1.0);
        let (gamma, beta, tau) = (sol[0], sol[1], sol[2]);

        let vw = -gamma * stats.sumwr - beta * stats.sumwsqr - tau * stats.sumuwr;
        let vu = -gamma * stats.sumur - beta * stats.sumuwr - tau * stats.sumusqr;
        let qfake = (-gamma - beta * wf - tau * uf) / big_n;
        let value = (vw - vu) / big_n + qfake * (wf - uf) * bounds.reward_mid();
        debug!(gamma, beta, tau, qfake, value, "cressie-read contrast estimate");

        let span = bounds.rmax - bounds.rmin;
        Ok(value.clamp(-span, span))
    }

    /// Confidence interval for the contrast `E[(w − u)·r]`.
    ///
    /// Each side enumerates fake weights over `{wmin, wmax}²` and fake
    /// rewards over `{rmin, rmax}`, regressing the signed contrast on both
    /// weight constraints.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidAlpha`, `CrError::InvalidSampleSize`,
    ///   `CrError::UnboundedWeightsUnsupported`, `CrError::Distribution`.
    /// - `CrError::NoFeasibleBranch` with `raise_on_err`.
    pub fn interval_diff(&self, stats: &DiffStatistics, alpha: f64) -> CrResult<Interval> {
        validate_alpha(alpha)?;
        validate_sample_size(stats.n)?;
        let bounds = &self.options.bounds;
        if bounds.wmax.is_infinite() {
            return Err(CrError::UnboundedWeightsUnsupported);
        }
        let n = stats.n;
        let big_n = n + 1.0;
        let span = bounds.rmax - bounds.rmin;

        let delta = self.options.critical.quantile(alpha, n)?;
        let wf = fake_weight(stats.sumw, n, bounds);
        let uf = fake_weight(stats.sumu, n, bounds);
        let unc = ContrastMoments::new(stats, 1.0, wf, uf, bounds.reward_mid())
            .regression()
            .map_or(0.0, |r| big_n * r.bsb);
        let phi = (-unc - delta) / (2.0 * big_n);

        let mut ends = [0.0; 2];
        for (slot, side) in ends.iter_mut().zip([Side::Lower, Side::Upper]) {
            let mut best: Option<f64> = None;
            for wf in [bounds.wmin, bounds.wmax] {
                for uf in [bounds.wmin, bounds.wmax] {
                    for rf in [bounds.rmin, bounds.rmax] {
                        let moments = ContrastMoments::new(stats, side.sign(), wf, uf, rf);
                        let Some(reg) = moments.regression() else {
                            trace!(side = side.label(), wf, uf, "singular contrast covariance");
                            continue;
                        };
                        let z = phi + 0.5 * reg.bsb;
                        match resolve_branch(reg.x, reg.y, z) {
                            Some((gstar, _)) => {
                                if best.is_none_or(|g| gstar < g) {
                                    best = Some(gstar);
                                }
                            }
                            None => trace!(side = side.label(), wf, uf, rf, "infeasible branch"),
                        }
                    }
                }
            }
            *slot = match best {
                Some(g) => (side.sign() * g).clamp(-span, span),
                None if self.options.raise_on_err => {
                    return Err(CrError::NoFeasibleBranch { side: side.label() });
                }
                None => {
                    warn!(side = side.label(), "no feasible contrast branch; using trivial bound");
                    -side.sign() * span
                }
            };
        }
        Ok(Interval::new(ends[0], ends[1]))
    }
}

/// Fake weight completing the sample: `wmax` when the weight mass
/// under-covers the count, `wmin` otherwise.
fn fake_weight(sumw: f64, n: f64, bounds: &CrBounds) -> f64 {
    if sumw < n { bounds.wmax } else { bounds.wmin }
}

/// Reward-free reference value of the divergence at the unconstrained
/// optimum, `N·(1 − w̄)²/var(w)` over the augmented sample.
fn unconstrained_gstar(stats: &SufficientStatistics, bounds: &CrBounds) -> f64 {
    let n = stats.n;
    let wfake = fake_weight(stats.sumw, n, bounds);
    if wfake.is_infinite() {
        return 1.0 + 1.0 / n;
    }
    let big_n = n + 1.0;
    let a = (wfake + stats.sumw) / big_n;
    let b = (wfake * wfake + stats.sumwsq) / big_n;
    let var = b - a * a;
    if var <= 0.0 { 0.0 } else { big_n * (a - 1.0).powi(2) / var }
}

/// Apply the feasibility rule to a branch and return `(gstar, kappa)`.
fn resolve_branch(x: f64, y: f64, z: f64) -> Option<(f64, f64)> {
    let y = if (y * z).abs() < YZ_EPS { 0.0 } else { y };
    if !x.is_finite() || !(z <= 0.0 && y * z >= 0.0) {
        return None;
    }
    let kappa = if z < 0.0 { (y / (2.0 * z)).sqrt() } else { 0.0 };
    Some((x - (2.0 * y * z).sqrt(), kappa))
}

/// Branch with a finite fake point `(wfake, r_side)`.
fn bounded_branch(
    stats: &SufficientStatistics, side: Side, bounds: &CrBounds, phi: f64, wfake: f64,
) -> Option<(f64, DualSolution)> {
    let sign = side.sign();
    let r = side.reward(bounds);
    let big_n = stats.n + 1.0;
    let wsq = wfake * wfake;

    let barw = (wfake + stats.sumw) / big_n;
    let barwsq = (wsq + stats.sumwsq) / big_n;
    let barwr = sign * (wfake * r + stats.sumwr) / big_n;
    let barwsqr = sign * (wsq * r + stats.sumwsqr) / big_n;
    let barwsqrsq = (wsq * r * r + stats.sumwsqrsq) / big_n;

    let var = barwsq - barw * barw;
    if var <= 0.0 {
        return None;
    }
    let cov = barwsqr - barw * barwr;
    let x = barwr + (1.0 - barw) * cov / var;
    let y = cov * cov / var - (barwsqrsq - barwr * barwr);
    let z = phi + 0.5 * (1.0 - barw).powi(2) / var;
    let (gstar, kappa) = resolve_branch(x, y, z)?;

    let slope = cov / var;
    let c = (1.0 - barw) / var;
    let betastar = -slope - c * kappa;
    let gammastar = c * kappa * barw - barwr + slope * barw;
    Some((gstar, DualSolution::new(sign, gammastar, betastar, kappa, wfake)))
}

/// Branch with the fake point pushed to `w = +∞` (closed-form limit).
fn unbounded_branch(
    stats: &SufficientStatistics, side: Side, bounds: &CrBounds, phi: f64,
) -> Option<(f64, DualSolution)> {
    let sign = side.sign();
    let r = side.reward(bounds);
    let n = stats.n;
    let big_n = n + 1.0;

    let x = sign * (r + (stats.sumwr - stats.sumw * r) / n);
    let centered = r * stats.sumw - stats.sumwr;
    let y = centered * centered / (n * big_n)
        - (r * r * stats.sumwsq - 2.0 * r * stats.sumwsqr + stats.sumwsqrsq) / big_n;
    let z = phi + 1.0 / (2.0 * n);
    let (gstar, kappa) = resolve_branch(x, y, z)?;

    let betastar = -sign * r;
    let ubar = sign * (stats.sumwr - r * stats.sumw) / n;
    let gammastar = -ubar - kappa / n;
    Some((gstar, DualSolution::new(sign, gammastar, betastar, kappa, f64::INFINITY)))
}

/// Augmented first and second moments of `(w, u, v)` for one fake point,
/// where `v = sign·(w − u)·r`.
struct ContrastMoments {
    ew: f64,
    eu: f64,
    ev: f64,
    eww: f64,
    euu: f64,
    euw: f64,
    evv: f64,
    evw: f64,
    evu: f64,
}

/// Least-squares pieces of the contrast branch.
struct ContrastRegression {
    x: f64,
    y: f64,
    bsb: f64,
}

impl ContrastMoments {
    fn new(stats: &DiffStatistics, sign: f64, wf: f64, uf: f64, rf: f64) -> Self {
        let big_n = stats.n + 1.0;
        let vf = (wf - uf) * rf;
        ContrastMoments {
            ew: (stats.sumw + wf) / big_n,
            eu: (stats.sumu + uf) / big_n,
            ev: sign * (stats.sumwr - stats.sumur + vf) / big_n,
            eww: (stats.sumwsq + wf * wf) / big_n,
            euu: (stats.sumusq + uf * uf) / big_n,
            euw: (stats.sumuw + uf * wf) / big_n,
            evv: (stats.sumwsqrsq - 2.0 * stats.sumuwrsq + stats.sumusqrsq + vf * vf) / big_n,
            evw: sign * (stats.sumwsqr - stats.sumuwr + vf * wf) / big_n,
            evu: sign * (stats.sumuwr - stats.sumusqr + vf * uf) / big_n,
        }
    }

    /// Regress `v` on the centered weights; `None` if the pseudo-inverse
    /// cannot be formed.
    fn regression(&self) -> Option<ContrastRegression> {
        let sigma = Matrix2::new(
            self.eww - self.ew * self.ew,
            self.euw - self.ew * self.eu,
            self.euw - self.ew * self.eu,
            self.euu - self.eu * self.eu,
        );
        let pinv = sigma.pseudo_inverse(PINV_EPS).ok()?;
        let b = Vector2::new(1.0 - self.ew, 1.0 - self.eu);
        let c = Vector2::new(self.evw - self.ev * self.ew, self.evu - self.ev * self.eu);
        let var_v = self.evv - self.ev * self.ev;
        Some(ContrastRegression {
            x: self.ev + b.dot(&(pinv * c)),
            y: -(var_v - c.dot(&(pinv * c))),
            bsb: b.dot(&(pinv * b)),
        })
    }
}
