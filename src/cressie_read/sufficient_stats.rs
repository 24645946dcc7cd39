//! cressie_read::sufficient_stats — running moments of weight and reward.
//!
//! Purpose
//! -------
//! Aggregate `(count, weight, reward)` observations into the moments the
//! Cressie-Read solvers consume. Accumulation is backed by
//! [`IncrementalSum`] so long streams keep exactly rounded totals, and an
//! optional decay factor `tau` implements exponential forgetting.
//!
//! Key behaviors
//! -------------
//! - [`StatsAccumulator`] validates each observation, scales every running
//!   sum by `tau^count` (skipped when `tau = 1`), then adds the new
//!   contribution; [`StatsAccumulator::snapshot`] yields a plain
//!   [`SufficientStatistics`] value.
//! - [`SufficientStatistics::imputed`] fills censored rewards at a chosen
//!   value so the interval solver can evaluate the worst case per side.
//! - [`DiffAccumulator`] collects the joint moments of two policies'
//!   weights `(u, w)` and the reward for two-policy contrasts.
//!
//! Invariants & assumptions
//! ------------------------
//! - `sumwany ≤ sumw` and `sumwsqany ≤ sumwsq`: the `*any` sums only see
//!   observations whose reward is present. Without censoring they coincide.
//! - With `tau = 1` the sums are non-decreasing and accumulation in any
//!   grouping reproduces the same totals (exact replay).
//!
//! Conventions
//! -----------
//! - In columnar input a `NaN` reward marks a missing (censored) reward.
//!
//! Downstream usage
//! ----------------
//! - `CrMinusTwo` reads snapshots; `OnlineCressieRead` owns an accumulator.
use crate::cressie_read::{
    errors::{CrError, CrResult},
    options::{CrBounds, CrOptions},
    validation::{validate_decay, validate_observation},
};
use crate::numerics::IncrementalSum;
use ndarray::ArrayView1;

/// Observation — one logged `(count, weight, reward)` record.
///
/// `reward = None` denotes a censored record (the reward was not observed).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub count: f64,
    pub weight: f64,
    pub reward: Option<f64>,
}

impl Observation {
    pub fn new(count: f64, weight: f64, reward: Option<f64>) -> Self {
        Observation { count, weight, reward }
    }
}

/// SufficientStatistics — aggregated moments of a single policy's weights.
///
/// Fields
/// ------
/// - `n`: (decayed) sample count.
/// - `sumw`, `sumwsq`: `Σ c·w`, `Σ c·w²`.
/// - `sumwr`, `sumwsqr`, `sumwsqrsq`: `Σ c·w·r`, `Σ c·w²·r`, `Σ c·w²·r²`
///   over reward-observed records.
/// - `sumwany`, `sumwsqany`: `Σ c·w`, `Σ c·w²` over reward-observed records.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SufficientStatistics {
    pub n: f64,
    pub sumw: f64,
    pub sumwsq: f64,
    pub sumwr: f64,
    pub sumwsqr: f64,
    pub sumwsqrsq: f64,
    pub sumwany: f64,
    pub sumwsqany: f64,
}

impl SufficientStatistics {
    /// Statistics of a fully observed sample (`sumwany = sumw`,
    /// `sumwsqany = sumwsq`).
    pub fn uncensored(
        n: f64, sumw: f64, sumwsq: f64, sumwr: f64, sumwsqr: f64, sumwsqrsq: f64,
    ) -> Self {
        SufficientStatistics {
            n,
            sumw,
            sumwsq,
            sumwr,
            sumwsqr,
            sumwsqrsq,
            sumwany: sumw,
            sumwsqany: sumwsq,
        }
    }

    /// Fill every missing reward with `reward`.
    ///
    /// The unobserved weight mass `sumw − sumwany` (and its square
    /// counterpart) is credited to the reward moments at `reward`; the
    /// result is fully observed.
    pub fn imputed(&self, reward: f64) -> Self {
        let missing_w = self.sumw - self.sumwany;
        let missing_wsq = self.sumwsq - self.sumwsqany;
        SufficientStatistics {
            sumwr: self.sumwr + reward * missing_w,
            sumwsqr: self.sumwsqr + reward * missing_wsq,
            sumwsqrsq: self.sumwsqrsq + reward * reward * missing_wsq,
            sumwany: self.sumw,
            sumwsqany: self.sumwsq,
            ..*self
        }
    }
}

/// StatsAccumulator — streaming, optionally decayed, sufficient statistics.
///
/// Fields
/// ------
/// - `bounds`, `censored`: observation contract copied from [`CrOptions`].
/// - `tau`: decay factor in `(0, 1]`.
/// - one [`IncrementalSum`] per moment of [`SufficientStatistics`].
#[derive(Debug, Clone, PartialEq)]
pub struct StatsAccumulator {
    bounds: CrBounds,
    censored: bool,
    tau: f64,
    n: IncrementalSum,
    sumw: IncrementalSum,
    sumwsq: IncrementalSum,
    sumwr: IncrementalSum,
    sumwsqr: IncrementalSum,
    sumwsqrsq: IncrementalSum,
    sumwany: IncrementalSum,
    sumwsqany: IncrementalSum,
}

impl StatsAccumulator {
    /// Empty accumulator.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidDecay` unless `tau ∈ (0, 1]`.
    pub fn new(options: &CrOptions, tau: f64) -> CrResult<Self> {
        validate_decay(tau)?;
        Ok(StatsAccumulator {
            bounds: options.bounds,
            censored: options.censored,
            tau,
            n: IncrementalSum::new(),
            sumw: IncrementalSum::new(),
            sumwsq: IncrementalSum::new(),
            sumwr: IncrementalSum::new(),
            sumwsqr: IncrementalSum::new(),
            sumwsqrsq: IncrementalSum::new(),
            sumwany: IncrementalSum::new(),
            sumwsqany: IncrementalSum::new(),
        })
    }

    /// Accumulator pre-filled from an iterator of observations.
    ///
    /// Errors
    /// ------
    /// - Propagates the first validation failure from [`StatsAccumulator::observe`].
    pub fn from_observations<I>(options: &CrOptions, tau: f64, observations: I) -> CrResult<Self>
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut acc = StatsAccumulator::new(options, tau)?;
        for obs in observations {
            acc.observe(obs.count, obs.weight, obs.reward)?;
        }
        Ok(acc)
    }

    /// Accumulator pre-filled from equally long columns; `NaN` rewards are
    /// treated as missing.
    ///
    /// Errors
    /// ------
    /// - `CrError::ColumnLengthMismatch` when the columns differ in length.
    /// - Propagates observation validation failures.
    pub fn from_columns(
        options: &CrOptions, tau: f64, counts: ArrayView1<f64>, weights: ArrayView1<f64>,
        rewards: ArrayView1<f64>,
    ) -> CrResult<Self> {
        let expected = counts.len();
        for found in [weights.len(), rewards.len()] {
            if found != expected {
                return Err(CrError::ColumnLengthMismatch { expected, found });
            }
        }
        let mut acc = StatsAccumulator::new(options, tau)?;
        for ((&c, &w), &r) in counts.iter().zip(weights.iter()).zip(rewards.iter()) {
            let reward = if r.is_nan() { None } else { Some(r) };
            acc.observe(c, w, reward)?;
        }
        Ok(acc)
    }

    /// Fold one observation into the running sums.
    ///
    /// Existing sums are scaled by `tau^count` first, then `count·w^k·r^j`
    /// contributions are added. Rewards only reach the `*r*` and `*any`
    /// sums when present.
    ///
    /// Errors
    /// ------
    /// - `CrError::InvalidCount`, `CrError::WeightOutOfRange`,
    ///   `CrError::RewardOutOfRange`, `CrError::MissingReward`.
    pub fn observe(&mut self, count: f64, weight: f64, reward: Option<f64>) -> CrResult<()> {
        validate_observation(count, weight, reward, &self.bounds, self.censored)?;

        if self.tau < 1.0 {
            let factor = self.tau.powf(count);
            for sum in self.sums_mut() {
                sum.scale(factor);
            }
        }

        let cw = count * weight;
        let cwsq = cw * weight;
        self.n.add(count);
        self.sumw.add(cw);
        self.sumwsq.add(cwsq);
        if let Some(r) = reward {
            self.sumwany.add(cw);
            self.sumwsqany.add(cwsq);
            self.sumwr.add(cw * r);
            self.sumwsqr.add(cwsq * r);
            self.sumwsqrsq.add(cwsq * r * r);
        }
        Ok(())
    }

    /// Add the sums of `other` into `self`.
    ///
    /// Only undecayed accumulators can be merged: with forgetting, the
    /// relative age of the two streams is not recoverable.
    ///
    /// Errors
    /// ------
    /// - `CrError::IncompatibleDecay` unless both accumulators use `tau = 1`.
    pub fn merge(&mut self, other: &StatsAccumulator) -> CrResult<()> {
        if self.tau != 1.0 || other.tau != 1.0 {
            return Err(CrError::IncompatibleDecay { left: self.tau, right: other.tau });
        }
        for (mine, theirs) in self.sums_mut().into_iter().zip(other.sums()) {
            mine.merge(theirs);
        }
        Ok(())
    }

    /// Current totals as a plain value.
    pub fn snapshot(&self) -> SufficientStatistics {
        SufficientStatistics {
            n: self.n.value(),
            sumw: self.sumw.value(),
            sumwsq: self.sumwsq.value(),
            sumwr: self.sumwr.value(),
            sumwsqr: self.sumwsqr.value(),
            sumwsqrsq: self.sumwsqrsq.value(),
            sumwany: self.sumwany.value(),
            sumwsqany: self.sumwsqany.value(),
        }
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn bounds(&self) -> &CrBounds {
        &self.bounds
    }

    fn sums(&self) -> [&IncrementalSum; 8] {
        [
            &self.n,
            &self.sumw,
            &self.sumwsq,
            &self.sumwr,
            &self.sumwsqr,
            &self.sumwsqrsq,
            &self.sumwany,
            &self.sumwsqany,
        ]
    }

    fn sums_mut(&mut self) -> [&mut IncrementalSum; 8] {
        [
            &mut self.n,
            &mut self.sumw,
            &mut self.sumwsq,
            &mut self.sumwr,
            &mut self.sumwsqr,
            &mut self.sumwsqrsq,
            &mut self.sumwany,
            &mut self.sumwsqany,
        ]
    }
}

/// DiffStatistics — joint moments of two policies' weights `(u, w)` and the
/// reward, for contrasts `E[(w − u)·r]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DiffStatistics {
    pub n: f64,
    pub sumw: f64,
    pub sumwsq: f64,
    pub sumu: f64,
    pub sumusq: f64,
    pub sumuw: f64,
    pub sumwr: f64,
    pub sumur: f64,
    pub sumwsqr: f64,
    pub sumusqr: f64,
    pub sumuwr: f64,
    pub sumwsqrsq: f64,
    pub sumusqrsq: f64,
    pub sumuwrsq: f64,
}

/// DiffAccumulator — streaming [`DiffStatistics`] (no decay, no censoring).
#[derive(Debug, Clone, PartialEq)]
pub struct DiffAccumulator {
    bounds: CrBounds,
    sums: [IncrementalSum; 14],
}

impl DiffAccumulator {
    pub fn new(bounds: CrBounds) -> Self {
        DiffAccumulator { bounds, sums: Default::default() }
    }

    /// Fold one `(count, u, w, r)` record, where `u` and `w` are the
    /// importance weights of the two policies for the same logged action.
    ///
    /// Errors
    /// ------
    /// - Observation validation failures for either weight or the reward.
    pub fn observe(&mut self, count: f64, u: f64, w: f64, r: f64) -> CrResult<()> {
        validate_observation(count, u, Some(r), &self.bounds, false)?;
        validate_observation(count, w, Some(r), &self.bounds, false)?;

        let terms = [
            1.0,
            w,
            w * w,
            u,
            u * u,
            u * w,
            w * r,
            u * r,
            w * w * r,
            u * u * r,
            u * w * r,
            w * w * r * r,
            u * u * r * r,
            u * w * r * r,
        ];
        for (sum, term) in self.sums.iter_mut().zip(terms) {
            sum.add(count * term);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> DiffStatistics {
        let v: [f64; 14] = std::array::from_fn(|i| self.sums[i].value());
        DiffStatistics {
            n: v[0],
            sumw: v[1],
            sumwsq: v[2],
            sumu: v[3],
            sumusq: v[4],
            sumuw: v[5],
            sumwr: v[6],
            sumur: v[7],
            sumwsqr: v[8],
            sumusqr: v[9],
            sumuwr: v[10],
            sumwsqrsq: v[11],
            sumusqrsq: v[12],
            sumuwrsq: v[13],
        }
    }
}
