//! Session clock: owns the monotonic tick and request id counters.
//!
//! RULE: Nothing in the session reads the platform clock directly.
//! Every timestamp on a prediction or event comes from SessionClock,
//! so ordering is decided by the tick and never by wall-clock time.

use crate::types::{RequestId, Tick};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClock {
    pub current_tick:    Tick,
    next_request_id:     RequestId,
}

/// One reading of the clock.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ClockReading {
    pub tick: Tick,
    pub at:   DateTime<Utc>,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            current_tick:    0,
            next_request_id: 1,
        }
    }

    /// Advance one tick and stamp it with the wall-clock time.
    /// Ticks are strictly increasing for the life of the session.
    pub fn now(&mut self) -> ClockReading {
        self.current_tick += 1;
        ClockReading {
            tick: self.current_tick,
            at:   Utc::now(),
        }
    }

    pub fn next_request_id(&mut self) -> RequestId {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
