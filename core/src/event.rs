//! The session event log: a bounded record of every accepted command and its outcome.
//!
//! RULE: Events are written only by the workflow, after the state
//! change they describe has been committed. Rejected commands leave
//! no event.

use crate::{
    profile::{FieldValue, ProfileField},
    types::{PredictionId, RequestId, Tick},
    workflow::RequestKind,
};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    FieldEdited {
        tick:       Tick,
        field:      ProfileField,
        value:      FieldValue,
        /// Dependent fields the resolver rewrote alongside the edit.
        normalized: Vec<ProfileField>,
    },
    RequestIssued {
        tick:       Tick,
        request_id: RequestId,
        kind:       RequestKind,
    },
    PredictionRecorded {
        tick:          Tick,
        request_id:    RequestId,
        prediction_id: PredictionId,
        probability:   f64,
        is_churn:      bool,
        driver_count:  usize,
    },
    SimulationRecorded {
        tick:        Tick,
        request_id:  RequestId,
        probability: f64,
        delta:       f64,
    },
    RequestFailed {
        tick:       Tick,
        request_id: RequestId,
        kind:       RequestKind,
        cause:      String,
    },
}

impl SessionEvent {
    /// Stable name of the variant, for logs.
    pub fn type_name(&self) -> &'static str {
        match self {
            SessionEvent::FieldEdited { .. }        => "field_edited",
            SessionEvent::RequestIssued { .. }      => "request_issued",
            SessionEvent::PredictionRecorded { .. } => "prediction_recorded",
            SessionEvent::SimulationRecorded { .. } => "simulation_recorded",
            SessionEvent::RequestFailed { .. }      => "request_failed",
        }
    }
}

/// Ring buffer of events. When full, the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct EventLog {
    capacity: usize,
    entries:  VecDeque<SessionEvent>,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries:  VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: SessionEvent) {
        log::debug!("event: {}", event.type_name());
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEvent> + '_ {
        self.entries.iter()
    }

    /// The `n` newest events, oldest first.
    pub fn recent(&self, n: usize) -> Vec<SessionEvent> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }
}
