//! Prediction records: what the gateway returns and what the workflow keeps.

use crate::{
    clock::ClockReading,
    config::RiskThresholds,
    error::{ChurnError, ChurnResult},
    types::PredictionId,
};
use serde::{Deserialize, Serialize};

// ── Gateway payloads ─────────────────────────────────────────────────────────

/// Body of a /predict response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub probability: f64,
    #[serde(rename = "isChurn", default, skip_serializing_if = "Option::is_none")]
    pub is_churn:    Option<bool>,
}

impl PredictionOutcome {
    pub fn new(probability: f64) -> Self {
        Self { probability, is_churn: None }
    }

    pub fn with_label(mut self, is_churn: bool) -> Self {
        self.is_churn = Some(is_churn);
        self
    }

    /// A probability outside [0, 1] is a malformed response.
    pub fn validate(&self) -> ChurnResult<()> {
        if !self.probability.is_finite() || !(0.0..=1.0).contains(&self.probability) {
            return Err(ChurnError::gateway(format!(
                "malformed response: probability {} outside [0, 1]",
                self.probability
            )));
        }
        Ok(())
    }
}

/// One explanatory factor. Positive impact raises churn risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub feature: String,
    pub value:   serde_json::Value,
    pub impact:  f64,
}

impl Driver {
    pub fn increases_risk(&self) -> bool {
        self.impact > 0.0
    }
}

/// Drivers in the order the service ranked them (|impact| descending).
pub type DriverSet = Vec<Driver>;

/// Body of an /explain response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub top_drivers: DriverSet,
}

pub fn validate_drivers(drivers: &[Driver]) -> ChurnResult<()> {
    if let Some(bad) = drivers.iter().find(|d| !d.impact.is_finite()) {
        return Err(ChurnError::gateway(format!(
            "malformed response: driver '{}' has non-finite impact",
            bad.feature
        )));
    }
    Ok(())
}

// ── Recorded results ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub id:          PredictionId,
    pub probability: f64,
    pub is_churn:    bool,
    pub timestamp:   ClockReading,
}

impl PredictionResult {
    /// The service's own label wins. Without one, threshold locally.
    pub fn from_outcome(
        outcome: &PredictionOutcome,
        thresholds: &RiskThresholds,
        timestamp: ClockReading,
    ) -> Self {
        let is_churn = outcome
            .is_churn
            .unwrap_or(outcome.probability >= thresholds.churn_threshold);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            probability: outcome.probability,
            is_churn,
            timestamp,
        }
    }

    pub fn probability_percent(&self) -> f64 {
        self.probability * 100.0
    }

    pub fn is_high_risk(&self, thresholds: &RiskThresholds) -> bool {
        self.probability >= thresholds.high_risk_threshold
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_churn { "Likely to Churn" } else { "Unlikely to Churn" }
    }
}

/// Append-only record of baseline predictions, oldest first.
///
/// Only the workflow appends. Everyone else gets a slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionHistory {
    entries: Vec<PredictionResult>,
}

impl PredictionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, result: PredictionResult) {
        self.entries.push(result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&PredictionResult> {
        self.entries.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PredictionResult> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[PredictionResult] {
        &self.entries
    }
}
