//! The prediction workflow: the session's single state container.
//!
//! STATES:
//!   Idle        accepts edits, submit, and simulate (once a baseline exists)
//!   Predicting  one baseline request pair in flight
//!   Simulating  one what-if request pair in flight
//!
//! RULES:
//!   - At most one request pair is in flight. While not Idle, every
//!     command is rejected with Busy and nothing changes.
//!   - predict and explain for one request commit together or not at
//!     all. A failure of either discards both.
//!   - Only a successful baseline appends to history. Simulations
//!     never touch history or the baseline.
//!   - Every request, failed or not, returns the workflow to Idle.
//!
//! Requests run in two phases so callers (and tests) can observe the
//! in-flight state: begin_submit()/begin_simulate() hand out a
//! RequestTicket, complete() consumes it. submit()/simulate() do both
//! around the gateway calls.

use crate::{
    analytics::{self, AnalyticsSummary, TrendPoint},
    clock::SessionClock,
    command::SessionCommand,
    config::SessionConfig,
    error::{ChurnError, ChurnResult},
    event::{EventLog, SessionEvent},
    gateway::PredictionGateway,
    prediction::{
        validate_drivers, Driver, DriverSet, PredictionHistory, PredictionOutcome,
        PredictionResult,
    },
    profile::{CustomerProfile, FieldValue, ProfileField},
    resolver,
    snapshot::{SessionSnapshot, SNAPSHOT_EVENT_TAIL},
    types::{RequestId, Tick},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Idle,
    Predicting,
    Simulating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Baseline,
    Simulation,
}

impl RequestKind {
    fn in_flight_state(self) -> WorkflowState {
        match self {
            RequestKind::Baseline   => WorkflowState::Predicting,
            RequestKind::Simulation => WorkflowState::Simulating,
        }
    }
}

/// Proof of one in-flight request pair. Not Clone: completing it
/// consumes it, so a pair can only be committed once. Bound to the
/// workflow that issued it; request ids alone repeat across sessions.
#[derive(Debug)]
pub struct RequestTicket {
    session: Uuid,
    id:      RequestId,
    kind:    RequestKind,
    profile: CustomerProfile,
}

impl RequestTicket {
    pub fn session_id(&self) -> Uuid {
        self.session
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// The profile snapshot the request was issued for.
    pub fn profile(&self) -> &CustomerProfile {
        &self.profile
    }
}

/// The comparison anchor: last successful baseline and its input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub prediction: PredictionResult,
    pub profile:    CustomerProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub prediction: PredictionResult,
    pub profile:    CustomerProfile,
    pub drivers:    DriverSet,
}

pub struct Workflow {
    session_id: Uuid,
    config:     SessionConfig,
    clock:      SessionClock,
    profile:    CustomerProfile,
    state:      WorkflowState,
    in_flight:  Option<RequestId>,
    history:    PredictionHistory,
    current:    Option<PredictionResult>,
    drivers:    DriverSet,
    baseline:   Option<Baseline>,
    simulation: Option<Simulation>,
    last_error: Option<String>,
    events:     EventLog,
}

impl Workflow {
    /// Start a session with the default profile.
    pub fn new(config: SessionConfig) -> Self {
        let events = EventLog::with_capacity(config.event_log_capacity);
        Self {
            session_id: Uuid::new_v4(),
            config,
            clock:      SessionClock::new(),
            profile:    CustomerProfile::default(),
            state:      WorkflowState::Idle,
            in_flight:  None,
            history:    PredictionHistory::new(),
            current:    None,
            drivers:    Vec::new(),
            baseline:   None,
            simulation: None,
            last_error: None,
            events,
        }
    }

    /// Start a session from an existing profile. The profile must
    /// already satisfy the dependent-field invariant.
    pub fn with_profile(config: SessionConfig, profile: CustomerProfile) -> ChurnResult<Self> {
        profile.check_consistency()?;
        let mut workflow = Self::new(config);
        workflow.profile = profile;
        Ok(workflow)
    }

    // ── Read-only views ─────────────────────────────────────────

    pub fn session_id(&self) -> Uuid { self.session_id }
    pub fn config(&self) -> &SessionConfig { &self.config }
    pub fn profile(&self) -> &CustomerProfile { &self.profile }
    pub fn state(&self) -> WorkflowState { self.state }
    pub fn history(&self) -> &PredictionHistory { &self.history }
    pub fn current_prediction(&self) -> Option<&PredictionResult> { self.current.as_ref() }
    pub fn drivers(&self) -> &[Driver] { &self.drivers }
    pub fn baseline(&self) -> Option<&Baseline> { self.baseline.as_ref() }
    pub fn simulation(&self) -> Option<&Simulation> { self.simulation.as_ref() }
    pub fn last_error(&self) -> Option<&str> { self.last_error.as_deref() }
    pub fn events(&self) -> &EventLog { &self.events }
    pub fn current_tick(&self) -> Tick { self.clock.current_tick }

    pub fn base_prediction(&self) -> Option<&PredictionResult> {
        self.baseline.as_ref().map(|b| &b.prediction)
    }

    pub fn sim_prediction(&self) -> Option<&PredictionResult> {
        self.simulation.as_ref().map(|s| &s.prediction)
    }

    pub fn sim_drivers(&self) -> &[Driver] {
        self.simulation.as_ref().map(|s| s.drivers.as_slice()).unwrap_or(&[])
    }

    pub fn can_simulate(&self) -> bool {
        self.baseline.is_some()
    }

    /// Simulated minus baseline probability, when both exist.
    pub fn delta(&self) -> Option<f64> {
        let base = self.base_prediction()?;
        let sim = self.sim_prediction()?;
        Some(sim.probability - base.probability)
    }

    pub fn analytics(&self) -> AnalyticsSummary {
        analytics::summarize(self.history.as_slice(), &self.config.thresholds)
    }

    pub fn trend(&self) -> impl Iterator<Item = TrendPoint> + Clone + '_ {
        analytics::trend(self.history.as_slice())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tick:               self.clock.current_tick,
            state:              self.state,
            can_simulate:       self.can_simulate(),
            profile:            self.profile.clone(),
            current_prediction: self.current.clone(),
            status_label:       self
                .current
                .as_ref()
                .map(|p| p.status_label())
                .unwrap_or("No prediction yet"),
            drivers:            self.drivers.clone(),
            base_prediction:    self.base_prediction().cloned(),
            base_profile:       self.baseline.as_ref().map(|b| b.profile.clone()),
            sim_prediction:     self.sim_prediction().cloned(),
            sim_drivers:        self.sim_drivers().to_vec(),
            delta:              self.delta(),
            history:            self.history.as_slice().to_vec(),
            analytics:          self.analytics(),
            trend:              self.trend().collect(),
            last_error:         self.last_error.clone(),
            recent_events:      self.events.recent(SNAPSHOT_EVENT_TAIL),
        }
    }

    // ── Commands ────────────────────────────────────────────────

    /// Apply one field edit through the resolver. On success the
    /// displayed prediction and its drivers are cleared; baseline,
    /// simulation and history are kept.
    pub fn edit_field(&mut self, field: ProfileField, value: FieldValue) -> ChurnResult<()> {
        self.ensure_idle("edit_field")?;

        let next = resolver::apply(&self.profile, field, &value).map_err(|e| {
            log::warn!("edit {field}={value} rejected: {e}");
            e
        })?;

        let normalized: Vec<ProfileField> = self
            .profile
            .diff(&next)
            .into_iter()
            .filter(|f| *f != field)
            .collect();
        if !normalized.is_empty() {
            log::debug!("edit {field}={value} normalized {normalized:?}");
        }

        self.profile = next;
        self.current = None;
        self.drivers.clear();

        let tick = self.clock.now().tick;
        self.events.push(SessionEvent::FieldEdited { tick, field, value, normalized });
        Ok(())
    }

    pub fn begin_submit(&mut self) -> ChurnResult<RequestTicket> {
        self.begin(RequestKind::Baseline)
    }

    pub fn begin_simulate(&mut self) -> ChurnResult<RequestTicket> {
        self.begin(RequestKind::Simulation)
    }

    /// Commit or discard the result of an in-flight request pair and
    /// return to Idle. Returns the recorded prediction on success.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: ChurnResult<(PredictionOutcome, DriverSet)>,
    ) -> ChurnResult<PredictionResult> {
        if ticket.session != self.session_id {
            return Err(ChurnError::InvariantViolation(format!(
                "ticket {} belongs to session {}, not {}",
                ticket.id, ticket.session, self.session_id
            )));
        }
        if self.in_flight != Some(ticket.id) {
            return Err(ChurnError::InvariantViolation(format!(
                "ticket {} does not match in-flight request {:?}",
                ticket.id, self.in_flight
            )));
        }

        self.state = WorkflowState::Idle;
        self.in_flight = None;

        let checked = result.and_then(|(outcome, drivers)| {
            outcome.validate()?;
            validate_drivers(&drivers)?;
            Ok((outcome, drivers))
        });

        let (outcome, drivers) = match checked {
            Ok(pair) => pair,
            Err(e) => return Err(self.record_failure(&ticket, e)),
        };

        let reading = self.clock.now();
        let prediction = PredictionResult::from_outcome(&outcome, &self.config.thresholds, reading);
        let RequestTicket { id: request_id, kind, profile, .. } = ticket;

        match kind {
            RequestKind::Baseline => {
                self.history.append(prediction.clone());
                self.current = Some(prediction.clone());
                self.baseline = Some(Baseline {
                    prediction: prediction.clone(),
                    profile,
                });
                self.simulation = None;
                let driver_count = drivers.len();
                self.drivers = drivers;

                log::info!(
                    "request={request_id} baseline recorded: p={:.3} churn={} (history={})",
                    prediction.probability,
                    prediction.is_churn,
                    self.history.len(),
                );
                self.events.push(SessionEvent::PredictionRecorded {
                    tick: reading.tick,
                    request_id,
                    prediction_id: prediction.id.clone(),
                    probability: prediction.probability,
                    is_churn: prediction.is_churn,
                    driver_count,
                });
            }
            RequestKind::Simulation => {
                self.simulation = Some(Simulation {
                    prediction: prediction.clone(),
                    profile,
                    drivers,
                });
                let delta = self.delta().unwrap_or(0.0);

                log::info!(
                    "request={request_id} simulation recorded: p={:.3} delta={delta:+.3}",
                    prediction.probability,
                );
                self.events.push(SessionEvent::SimulationRecorded {
                    tick: reading.tick,
                    request_id,
                    probability: prediction.probability,
                    delta,
                });
            }
        }

        self.last_error = None;
        Ok(prediction)
    }

    /// Run a baseline prediction for the current profile.
    pub async fn submit(&mut self, gateway: &dyn PredictionGateway) -> ChurnResult<PredictionResult> {
        let ticket = self.begin_submit()?;
        let result = request_pair(gateway, ticket.profile()).await;
        self.complete(ticket, result)
    }

    /// Run a what-if prediction for the current profile against the
    /// recorded baseline.
    pub async fn simulate(&mut self, gateway: &dyn PredictionGateway) -> ChurnResult<PredictionResult> {
        let ticket = self.begin_simulate()?;
        let result = request_pair(gateway, ticket.profile()).await;
        self.complete(ticket, result)
    }

    /// Dispatch a presentation-layer command.
    pub async fn execute(
        &mut self,
        command: SessionCommand,
        gateway: &dyn PredictionGateway,
    ) -> ChurnResult<()> {
        match command {
            SessionCommand::EditField { field, value } => self.edit_field(field, value),
            SessionCommand::Submit => self.submit(gateway).await.map(|_| ()),
            SessionCommand::Simulate => self.simulate(gateway).await.map(|_| ()),
        }
    }

    // ── Internals ───────────────────────────────────────────────

    fn ensure_idle(&self, command: &str) -> ChurnResult<()> {
        if self.state != WorkflowState::Idle {
            log::warn!("{command} rejected: workflow is {:?}", self.state);
            return Err(ChurnError::Busy { state: self.state });
        }
        Ok(())
    }

    fn begin(&mut self, kind: RequestKind) -> ChurnResult<RequestTicket> {
        self.ensure_idle(match kind {
            RequestKind::Baseline   => "submit",
            RequestKind::Simulation => "simulate",
        })?;

        if kind == RequestKind::Simulation && self.baseline.is_none() {
            log::warn!("simulate rejected: no baseline");
            return Err(ChurnError::NoBaseline);
        }

        debug_assert!(
            self.profile.is_consistent(),
            "profile left the resolver inconsistent: {:?}",
            self.profile
        );
        self.profile.check_consistency()?;

        let id = self.clock.next_request_id();
        self.state = kind.in_flight_state();
        self.in_flight = Some(id);

        let tick = self.clock.now().tick;
        self.events.push(SessionEvent::RequestIssued { tick, request_id: id, kind });
        log::debug!("request={id} issued ({kind:?})");

        Ok(RequestTicket {
            session: self.session_id,
            id,
            kind,
            profile: self.profile.clone(),
        })
    }

    fn record_failure(&mut self, ticket: &RequestTicket, error: ChurnError) -> ChurnError {
        log::warn!("request={} ({:?}) failed: {error}", ticket.id, ticket.kind);
        let cause = error.to_string();
        self.last_error = Some(cause.clone());
        let tick = self.clock.now().tick;
        self.events.push(SessionEvent::RequestFailed {
            tick,
            request_id: ticket.id,
            kind: ticket.kind,
            cause,
        });
        error
    }
}

/// Issue predict and explain for one profile, concurrently on the
/// current task. Both must succeed; the first failure wins.
async fn request_pair(
    gateway: &dyn PredictionGateway,
    profile: &CustomerProfile,
) -> ChurnResult<(PredictionOutcome, DriverSet)> {
    log::debug!("gateway={} issuing predict+explain", gateway.name());
    tokio::try_join!(gateway.predict(profile), gateway.explain(profile))
}
