//! Special functions used by the betting confidence sequences.
//!
//! `statrs` covers the distribution quantiles the Cressie-Read solver
//! needs, but not the trigamma function or the Riemann zeta function, so
//! both live here together with the small log-domain helpers shared by the
//! mixture-wealth computations.
//!
//! # Provided items
//! - [`trigamma`]: ψ₁(x) for x > 0 via upward recurrence plus the
//!   asymptotic series.
//! - [`riemann_zeta`]: ζ(s) for s > 1 via Euler–Maclaurin summation.
//! - [`log_add_exp`]: stable log-domain addition.
//! - [`fan_penalty`]: ψ_E(λ) = −ln(1 − λ) − λ.
//! - [`log_gap`]: g(y) = y − ln(1 + y).

/// Recurrence threshold for the asymptotic trigamma series.
const TRIGAMMA_ASYMPTOTIC_MIN: f64 = 20.0;

/// Number of explicit terms before the Euler–Maclaurin tail in ζ(s).
const ZETA_HEAD_TERMS: u32 = 10;

/// B₂ₖ / (2k)! for k = 1..=6.
const BERNOULLI_OVER_FACTORIAL: [f64; 6] = [
    1.0 / 12.0,
    -1.0 / 720.0,
    1.0 / 30_240.0,
    -1.0 / 1_209_600.0,
    1.0 / 47_900_160.0,
    -691.0 / 1_307_674_368_000.0,
];

/// Trigamma function ψ₁(x) = d²/dx² ln Γ(x) for `x > 0`.
///
/// Shifts `x` upward with ψ₁(x) = ψ₁(x + 1) + 1/x² until the asymptotic
/// expansion
/// `1/x + 1/(2x²) + Σₖ B₂ₖ/x²ᵏ⁺¹` (through B₁₂) is accurate to machine
/// precision; at x ≥ 20 the first omitted term is below 1e-19 relative.
///
/// Returns `NaN` for `x ≤ 0` or `NaN` input; `+∞` input maps to `0.0`.
pub fn trigamma(x: f64) -> f64 {
    if x.is_nan() || x <= 0.0 {
        return f64::NAN;
    }
    if x.is_infinite() {
        return 0.0;
    }

    let mut x = x;
    let mut acc = 0.0;
    while x < TRIGAMMA_ASYMPTOTIC_MIN {
        acc += 1.0 / (x * x);
        x += 1.0;
    }

    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = 1.0 / 30.0 - inv2 * (5.0 / 66.0 - inv2 * 691.0 / 2730.0);
    let tail = inv2 * inv * (1.0 / 6.0 - inv2 * (1.0 / 30.0 - inv2 * (1.0 / 42.0 - inv2 * series)));
    acc + inv + 0.5 * inv2 + tail
}

/// Riemann zeta function ζ(s) for real `s > 1`.
///
/// Sums the first [`ZETA_HEAD_TERMS`] − 1 terms explicitly and closes the
/// tail with the Euler–Maclaurin correction up to B₁₂. Returns `NaN` for
/// `s ≤ 1`.
pub fn riemann_zeta(s: f64) -> f64 {
    if s.is_nan() || s <= 1.0 {
        return f64::NAN;
    }

    let n = f64::from(ZETA_HEAD_TERMS);
    let mut head = 0.0;
    for i in 1..ZETA_HEAD_TERMS {
        head += f64::from(i).powf(-s);
    }

    let mut tail = n.powf(1.0 - s) / (s - 1.0) + 0.5 * n.powf(-s);
    let mut rising = s;
    let mut n_pow = n.powf(-s - 1.0);
    for (k, coef) in BERNOULLI_OVER_FACTORIAL.iter().enumerate() {
        tail += coef * rising * n_pow;
        let k = (k + 1) as f64;
        rising *= (s + 2.0 * k - 1.0) * (s + 2.0 * k);
        n_pow /= n * n;
    }
    head + tail
}

/// ln(eᵃ + eᵇ) without overflow.
#[inline]
pub fn log_add_exp(a: f64, b: f64) -> f64 {
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if hi == f64::INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

/// ψ_E(λ) = −ln(1 − λ) − λ for `λ ∈ [0, 1)`.
///
/// Fan's inequality: `g(λe) ≤ ψ_E(λ)·e²` whenever `e ∈ [−1, 0]`.
#[inline]
pub fn fan_penalty(lambda: f64) -> f64 {
    -(-lambda).ln_1p() - lambda
}

/// g(y) = y − ln(1 + y), the exact log-wealth shortfall of a bet `y > −1`.
#[inline]
pub fn log_gap(y: f64) -> f64 {
    y - y.ln_1p()
}
