use chrono::Utc;
use churn_desk_core::{
    analytics::{self, bucket_index, RISK_BUCKET_COUNT},
    clock::ClockReading,
    config::RiskThresholds,
    prediction::{PredictionOutcome, PredictionResult},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn history_of(probabilities: &[f64]) -> Vec<PredictionResult> {
    let thresholds = RiskThresholds::default();
    probabilities
        .iter()
        .enumerate()
        .map(|(i, p)| {
            PredictionResult::from_outcome(
                &PredictionOutcome::new(*p),
                &thresholds,
                ClockReading { tick: i as u64 + 1, at: Utc::now() },
            )
        })
        .collect()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Empty history reports zeros everywhere, never NaN.
#[test]
fn empty_history_is_all_zero() {
    let summary = analytics::summarize(&[], &RiskThresholds::default());

    assert_eq!(summary.total_predictions, 0);
    assert_eq!(summary.churn_count, 0);
    assert_eq!(summary.churn_rate, 0.0);
    assert_eq!(summary.avg_probability, 0.0);
    assert_eq!(summary.high_risk_count, 0);
    assert_eq!(summary.bucket_counts(), vec![0; RISK_BUCKET_COUNT]);
    assert_eq!(analytics::trend(&[]).count(), 0);
}

#[test]
fn four_prediction_history_summary() {
    let history = history_of(&[0.15, 0.45, 0.72, 0.81]);
    let summary = analytics::summarize(&history, &RiskThresholds::default());

    assert_eq!(summary.total_predictions, 4);
    // 0.45 falls in [0.4, 0.6): buckets are half-open intervals.
    assert_eq!(summary.bucket_counts(), vec![1, 0, 1, 1, 1]);
    assert_eq!(summary.high_risk_count, 2);
    assert!(approx(summary.avg_probability, 0.5325), "avg={}", summary.avg_probability);
    // 0.72 and 0.81 cross the 0.5 threshold, 0.45 does not.
    assert_eq!(summary.churn_count, 2);
    assert!(approx(summary.churn_rate, 0.5));
}

/// Edge values go to the upper bucket; 1.0 closes the last bucket.
#[test]
fn bucket_edges_route_upward() {
    assert_eq!(bucket_index(0.0), 0);
    assert_eq!(bucket_index(0.199_999), 0);
    assert_eq!(bucket_index(0.2), 1);
    assert_eq!(bucket_index(0.4), 2);
    assert_eq!(bucket_index(0.6), 3);
    assert_eq!(bucket_index(0.8), 4);
    assert_eq!(bucket_index(1.0), 4);
}

#[test]
fn bucket_counts_sum_to_total() {
    let probabilities: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
    let history = history_of(&probabilities);
    let summary = analytics::summarize(&history, &RiskThresholds::default());

    let sum: usize = summary.bucket_counts().iter().sum();
    assert_eq!(sum, summary.total_predictions);
    assert_eq!(summary.bucket_counts(), vec![20, 20, 20, 20, 21]);
}

#[test]
fn bucket_bounds_are_reported() {
    let summary = analytics::summarize(&history_of(&[0.5]), &RiskThresholds::default());
    let bounds: Vec<(f64, f64)> = summary.buckets.iter().map(|b| (b.lower, b.upper)).collect();
    assert_eq!(bounds, vec![(0.0, 0.2), (0.2, 0.4), (0.4, 0.6), (0.6, 0.8), (0.8, 1.0)]);
    assert_eq!(summary.buckets[2].label, "40-60%");
}

/// High-risk boundary is inclusive.
#[test]
fn high_risk_threshold_is_inclusive() {
    let summary = analytics::summarize(&history_of(&[0.69, 0.7, 0.71]), &RiskThresholds::default());
    assert_eq!(summary.high_risk_count, 2);
}

/// Service-provided labels feed churn_count even below the threshold.
#[test]
fn churn_count_uses_recorded_labels() {
    let thresholds = RiskThresholds::default();
    let labelled = PredictionResult::from_outcome(
        &PredictionOutcome::new(0.1).with_label(true),
        &thresholds,
        ClockReading { tick: 1, at: Utc::now() },
    );
    let summary = analytics::summarize(&[labelled], &thresholds);
    assert_eq!(summary.churn_count, 1);
    assert_eq!(summary.churn_rate, 1.0);
}

/// The trend is 1-based, in insertion order, and can be replayed.
#[test]
fn trend_is_replayable_in_insertion_order() {
    let history = history_of(&[0.3, 0.9, 0.05]);
    let series = analytics::trend(&history);

    let first: Vec<(usize, f64)> = series.clone().map(|t| (t.index, t.probability_percent)).collect();
    let second: Vec<(usize, f64)> = series.map(|t| (t.index, t.probability_percent)).collect();

    assert_eq!(first, second);
    assert_eq!(first.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(approx(first[0].1, 30.0));
    assert!(approx(first[1].1, 90.0));
    assert!(approx(first[2].1, 5.0));
}
