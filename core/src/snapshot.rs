//! Snapshot serialization: the read-only view handed to the
//! presentation layer after every command.

use crate::{
    analytics::{AnalyticsSummary, TrendPoint},
    event::SessionEvent,
    prediction::{DriverSet, PredictionResult},
    profile::CustomerProfile,
    types::Tick,
    workflow::WorkflowState,
};
use serde::Serialize;

/// Number of trailing events included in a snapshot.
pub const SNAPSHOT_EVENT_TAIL: usize = 20;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub tick:               Tick,
    pub state:              WorkflowState,
    pub can_simulate:       bool,
    pub profile:            CustomerProfile,
    pub current_prediction: Option<PredictionResult>,
    pub status_label:       &'static str,
    pub drivers:            DriverSet,
    pub base_prediction:    Option<PredictionResult>,
    pub base_profile:       Option<CustomerProfile>,
    pub sim_prediction:     Option<PredictionResult>,
    pub sim_drivers:        DriverSet,
    pub delta:              Option<f64>,
    pub history:            Vec<PredictionResult>,
    pub analytics:          AnalyticsSummary,
    pub trend:              Vec<TrendPoint>,
    pub last_error:         Option<String>,
    pub recent_events:      Vec<SessionEvent>,
}
