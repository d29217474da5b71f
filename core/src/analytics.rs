//! Analytics: KPIs and distributions derived from prediction history.
//!
//! RULE: No incremental state. Everything here is a pure function of
//! the history slice and is recomputed whenever history grows.

use crate::{config::RiskThresholds, prediction::PredictionResult};
use serde::{Deserialize, Serialize};

/// Lower edges of buckets 1..=4. A probability sitting exactly on an
/// edge belongs to the upper bucket; the last bucket is closed at 1.0.
pub const RISK_BUCKET_EDGES: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

pub const RISK_BUCKET_COUNT: usize = RISK_BUCKET_EDGES.len() + 1;

const RISK_BUCKET_LABELS: [&str; RISK_BUCKET_COUNT] =
    ["0-20%", "20-40%", "40-60%", "60-80%", "80-100%"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBucket {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_predictions: usize,
    pub churn_count:       usize,
    pub churn_rate:        f64,
    pub avg_probability:   f64,
    pub high_risk_count:   usize,
    pub buckets:           Vec<RiskBucket>,
}

impl AnalyticsSummary {
    pub fn bucket_counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }
}

/// One point of the probability trend: 1-based history position and
/// probability in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub index:               usize,
    pub probability_percent: f64,
}

/// Index of the bucket a probability falls in.
pub fn bucket_index(probability: f64) -> usize {
    RISK_BUCKET_EDGES
        .iter()
        .filter(|edge| probability >= **edge)
        .count()
}

pub fn summarize(history: &[PredictionResult], thresholds: &RiskThresholds) -> AnalyticsSummary {
    let total_predictions = history.len();

    let mut counts = [0usize; RISK_BUCKET_COUNT];
    let mut churn_count = 0;
    let mut high_risk_count = 0;
    let mut probability_sum = 0.0;

    for p in history {
        counts[bucket_index(p.probability)] += 1;
        if p.is_churn {
            churn_count += 1;
        }
        if p.is_high_risk(thresholds) {
            high_risk_count += 1;
        }
        probability_sum += p.probability;
    }

    // Empty history reports zeros, never NaN.
    let (churn_rate, avg_probability) = if total_predictions > 0 {
        let n = total_predictions as f64;
        (churn_count as f64 / n, probability_sum / n)
    } else {
        (0.0, 0.0)
    };

    let buckets = counts
        .iter()
        .enumerate()
        .map(|(i, count)| RiskBucket {
            label: RISK_BUCKET_LABELS[i].to_string(),
            lower: if i == 0 { 0.0 } else { RISK_BUCKET_EDGES[i - 1] },
            upper: RISK_BUCKET_EDGES.get(i).copied().unwrap_or(1.0),
            count: *count,
        })
        .collect();

    AnalyticsSummary {
        total_predictions,
        churn_count,
        churn_rate,
        avg_probability,
        high_risk_count,
        buckets,
    }
}

/// Trend series in insertion order. The iterator borrows the history
/// and can be cloned or rebuilt at any time.
pub fn trend(history: &[PredictionResult]) -> impl Iterator<Item = TrendPoint> + Clone + '_ {
    history.iter().enumerate().map(|(i, p)| TrendPoint {
        index:               i + 1,
        probability_percent: p.probability_percent(),
    })
}
