//! Integration tests for the off-policy evaluation pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end flow from logged `(count, weight, reward)`
//!   records, through accumulation, to point estimates and intervals.
//! - Exercise the streaming estimators the way a monitor would: query after
//!   every record and compare with the fixed-sample answer.
//!
//! Coverage
//! --------
//! - `numerics::IncrementalSum`: catastrophic-cancellation scenario.
//! - `cressie_read`:
//!   - `CrMinusTwo` estimate/interval on aggregated statistics, including
//!     censored columnar input and two-policy contrasts.
//!   - `OnlineCressieRead` replay equivalence with the batch solver.
//! - `confidence_sequence`:
//!   - `AnytimeConfidenceSequence` with dropped observations.
//!   - `RobustMixture` shrinkage and `Ddrm` convergence.
//!
//! Exclusions
//! ----------
//! - Special-function accuracy, validators and bucket routing; these are
//!   covered by unit tests.
//! - Coverage-rate simulations over many replications, which belong in
//!   dedicated statistical studies.
use approx::assert_relative_eq;
use ndarray::array;
use ope_estimators::{
    Interval,
    confidence_sequence::{AnytimeConfidenceSequence, AnytimeOptions, Ddrm, RobustMixture},
    cressie_read::{
        CrBounds, CrError, CrMinusTwo, CrOptions, CriticalValue, DiffAccumulator,
        OnlineCressieRead, StatsAccumulator, SufficientStatistics,
    },
    numerics::IncrementalSum,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Install a test-friendly `tracing` subscriber once; later calls are no-ops.
fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Bounds used throughout: weights in `[0, 10]`, rewards in `[0, 1]`.
fn unit_bounds() -> CrBounds {
    CrBounds::new(0.0, 10.0, 0.0, 1.0).expect("bounds should be valid")
}

/// Seeded logged stream: weights in `[0, 4)`, Bernoulli-ish rewards.
fn logged_stream(seed: u64, len: usize) -> Vec<(f64, f64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let w = rng.random_range(0.0..4.0);
            let r = if rng.random::<f64>() < 0.4 { 1.0 } else { 0.0 };
            (w, r)
        })
        .collect()
}

#[test]
// Purpose
// -------
// Verify exact cancellation in the compensated sum.
//
// Given
// -----
// - Increments [1e16, 1.0, -1e16] added in order.
//
// Expect
// ------
// - The value is exactly 1.0 while naive summation yields 0.0.
fn incremental_sum_survives_cancellation() {
    // Arrange
    let xs = [1e16, 1.0, -1e16];

    // Act
    let exact: f64 = xs.iter().copied().collect::<IncrementalSum>().into();
    let naive: f64 = xs.iter().sum();

    // Assert
    assert_eq!(exact, 1.0);
    assert_eq!(naive, 0.0);
}

#[test]
// Purpose
// -------
// Check the reference scenario of the batch estimator.
//
// Given
// -----
// - n = 3, sumw = 3, sumwsq = 3, sumwr = 1.5, sumwsqr = 1.5 with
//   w ∈ [0, 10], r ∈ [0, 1].
//
// Expect
// ------
// - The estimate equals the empirical mean 0.5 and lies in its interval.
fn batch_estimate_matches_reference_scenario() {
    init_tracing();

    // Arrange
    let stats = SufficientStatistics::uncensored(3.0, 3.0, 3.0, 1.5, 1.5, 1.5);
    let estimator = CrMinusTwo::new(CrOptions::new(unit_bounds()));

    // Act
    let value = estimator.estimate(&stats).expect("valid").expect("uncensored");
    let ci = estimator.interval(&stats, 0.05).expect("valid");

    // Assert
    assert_relative_eq!(value, 0.5, epsilon = 1e-12);
    assert!(ci.lower <= ci.upper && 0.0 <= ci.lower && ci.upper <= 1.0, "{ci:?}");
}

#[test]
// Purpose
// -------
// Ensure batch intervals are ordered, bounded, and nested in alpha on
// realistic logged data.
//
// Given
// -----
// - Five seeded streams of 300 records; alpha ∈ {0.01, 0.05, 0.2}.
//
// Expect
// ------
// - rmin ≤ lo ≤ hi ≤ rmax, and larger alpha never widens the interval.
fn batch_intervals_are_ordered_and_nested() {
    init_tracing();
    let estimator = CrMinusTwo::new(CrOptions::new(unit_bounds()));

    for seed in 0..5 {
        // Arrange
        let mut acc = StatsAccumulator::new(estimator.options(), 1.0).expect("valid tau");
        for (w, r) in logged_stream(seed, 300) {
            acc.observe(1.0, w, Some(r)).expect("valid record");
        }
        let stats = acc.snapshot();

        // Act
        let cis: Vec<Interval> = [0.01, 0.05, 0.2]
            .iter()
            .map(|&alpha| estimator.interval(&stats, alpha).expect("valid alpha"))
            .collect();

        // Assert
        for ci in &cis {
            assert!(0.0 <= ci.lower && ci.lower <= ci.upper && ci.upper <= 1.0, "{ci:?}");
        }
        for pair in cis.windows(2) {
            assert!(pair[1].width() <= pair[0].width() + 1e-12, "seed {seed}: {cis:?}");
        }
    }
}

#[test]
// Purpose
// -------
// Verify the replay property: streaming with tau = 1 reproduces the batch
// bound after every record.
//
// Given
// -----
// - 120 seeded records with replicate counts in {1, 2}.
//
// Expect
// ------
// - Identical intervals and matching qlb finiteness at each step.
fn online_estimator_replays_batch_bounds() {
    init_tracing();

    // Arrange
    let opts = CrOptions::new(unit_bounds());
    let batch = CrMinusTwo::new(opts.with_critical_value(CriticalValue::ChiSquared));
    let mut online = OnlineCressieRead::new(opts, 0.05, 1.0).expect("valid config");
    let mut acc = StatsAccumulator::new(&opts, 1.0).expect("valid tau");

    for (i, (w, r)) in logged_stream(17, 120).into_iter().enumerate() {
        let count = if i % 3 == 0 { 2.0 } else { 1.0 };

        // Act
        online.update(count, w, Some(r)).expect("valid record");
        acc.observe(count, w, Some(r)).expect("valid record");
        let expected = batch.interval(&acc.snapshot(), 0.05).expect("valid batch");

        // Assert
        assert_eq!(online.interval().expect("valid online"), expected, "step {i}");
        assert!(online.qlb(w, r).expect("dual").is_finite());
    }
    assert_eq!(online.statistics(), acc.snapshot());
}

#[test]
// Purpose
// -------
// Exercise censored columnar ingestion end to end.
//
// Given
// -----
// - Columns with NaN rewards, censored options, and a strict estimator.
//
// Expect
// ------
// - The censored estimate lies in [0, 1]; the strict accumulator rejects
//   the same columns with `MissingReward`.
fn censored_columns_flow_through_estimator() {
    // Arrange
    let counts = array![1.0, 2.0, 1.0, 1.0, 3.0];
    let weights = array![0.5, 1.5, 2.0, 0.2, 1.0];
    let rewards = array![1.0, f64::NAN, 0.0, 1.0, f64::NAN];
    let censored = CrOptions::new(unit_bounds()).with_censored(true);

    // Act
    let acc = StatsAccumulator::from_columns(
        &censored,
        1.0,
        counts.view(),
        weights.view(),
        rewards.view(),
    )
    .expect("valid columns");
    let value = CrMinusTwo::new(censored).estimate(&acc.snapshot()).expect("valid");
    let strict = StatsAccumulator::from_columns(
        &CrOptions::new(unit_bounds()),
        1.0,
        counts.view(),
        weights.view(),
        rewards.view(),
    );

    // Assert
    assert!(value.is_some_and(|v| (0.0..=1.0).contains(&v)), "{value:?}");
    assert_eq!(strict, Err(CrError::MissingReward));
}

#[test]
// Purpose
// -------
// Check the two-policy contrast on a stream where the target policy puts
// more weight on rewarded actions.
//
// Given
// -----
// - u = 1 everywhere; w = 1.5 on rewarded and 0.5 on unrewarded records.
//
// Expect
// ------
// - A positive contrast estimate and an ordered interval within [−1, 1].
fn contrast_pipeline_prefers_better_policy() {
    // Arrange
    let mut acc = DiffAccumulator::new(unit_bounds());
    for (_, r) in logged_stream(23, 400) {
        let w = if r > 0.5 { 1.5 } else { 0.5 };
        acc.observe(1.0, 1.0, w, r).expect("valid record");
    }
    let estimator = CrMinusTwo::new(CrOptions::new(unit_bounds()));

    // Act
    let diff = estimator.estimate_diff(&acc.snapshot()).expect("finite wmax");
    let ci = estimator.interval_diff(&acc.snapshot(), 0.05).expect("finite wmax");

    // Assert
    assert!(diff > 0.0, "{diff}");
    assert!(-1.0 <= ci.lower && ci.lower <= ci.upper && ci.upper <= 1.0, "{ci:?}");
}

#[test]
// Purpose
// -------
// Verify the continuous mixture with simulated drops keeps covering the
// drop-adjusted mean.
//
// Given
// -----
// - w = 1, r = 0.5, p_drop = 0.2 with the expected drop count.
//
// Expect
// ------
// - Intervals contain 0.5 and narrow between 500 and 2000 records.
fn anytime_sequence_with_drops_covers_mean() {
    // Arrange
    let mut cs = AnytimeConfidenceSequence::new(AnytimeOptions::default());
    let mut snapshots = Vec::new();

    // Act
    for i in 1..=2000 {
        cs.addobs(1.0, 0.5, 0.2, None).expect("valid record");
        if i == 500 || i == 2000 {
            snapshots.push(cs.getci(0.05).expect("valid alpha"));
        }
    }

    // Assert
    assert!(snapshots.iter().all(|ci| ci.contains(0.5)), "{snapshots:?}");
    assert!(snapshots[1].width() < snapshots[0].width());
    assert_relative_eq!(cs.t(), 2500.0, max_relative = 1e-12);
}

#[test]
// Purpose
// -------
// Check the countable mixture on a constant stream.
//
// Given
// -----
// - x = 0.5 for 2000 records, intervals read every 100.
//
// Expect
// ------
// - Every interval contains 0.5 and the widths never increase.
fn robust_mixture_shrinks_on_constant_stream() {
    // Arrange
    let mut rm = RobustMixture::default();
    let mut widths = Vec::new();

    // Act
    for i in 1..=2000 {
        rm.addobs(0.5).expect("valid");
        if i % 100 == 0 {
            let ci = rm.getci(0.05).expect("valid alpha");
            assert!(ci.contains(0.5), "{ci:?}");
            widths.push(ci.width());
        }
    }

    // Assert
    assert!(widths.windows(2).all(|p| p[1] <= p[0]), "{widths:?}");
    assert!(widths[widths.len() - 1] < widths[0]);
}

#[test]
// Purpose
// -------
// Verify that DDRM's lower end on E[w·r] rises monotonically for a
// perfect-reward stream.
//
// Given
// -----
// - (w, r) = (1, 1) for 3000 records, read every 500.
//
// Expect
// ------
// - Non-decreasing lower ends, strictly increasing once informative.
fn ddrm_lower_end_rises_toward_one() {
    // Arrange
    let mut ddrm = Ddrm::default();
    let mut lowers = Vec::new();

    // Act
    for i in 1..=3000 {
        ddrm.addobs((1.0, 1.0)).expect("valid pair");
        if i % 500 == 0 {
            lowers.push(ddrm.getci(0.05).expect("valid alpha").lower);
        }
    }

    // Assert
    assert!(lowers.windows(2).all(|p| p[1] >= p[0]), "{lowers:?}");
    assert!(lowers[lowers.len() - 1] > lowers[0], "{lowers:?}");
    assert!(lowers.iter().all(|&l| l < 1.0));
}
