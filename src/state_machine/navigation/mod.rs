//! Turn-by-turn navigation as a pure state machine.
//!
//! Each accepted sample is run through route matching, step selection, progress calculation and
//! arrival detection in one [`process_input`](StateMachine::process_input) call, and the
//! resulting notifications are queued for [`poll_output`](StateMachine::poll_output).
//!
//! The machine never talks to the location provider itself. It asks its runner to
//! [`Subscribe`](NavigationOutput::Subscribe) and [`Unsubscribe`](NavigationOutput::Unsubscribe)
//! and expects every sample to come back tagged with the [`Generation`] it subscribed with.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::StateMachine;
use crate::arrival::{DEFAULT_ARRIVAL_THRESHOLD_M, is_arrived};
use crate::geo::Coordinate;
use crate::location::error::ProviderError;
use crate::location::{PositionReading, PositionSample};
use crate::progress::Progress;
use crate::route::{RouteModel, active_step_index, match_position};
use crate::transport::TransportMode;

mod event;
mod session;

pub use self::event::{NavigationErrorKind, NavigationEvent, ProgressUpdate};
pub use self::session::{Generation, NavigationSession, SessionId};

/// Lifecycle of the navigation machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    Navigating,
    Arrived,
}

/// Parameters of a new session.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub session_id: SessionId,
    pub route: Arc<RouteModel>,
    pub mode: TransportMode,
    pub destination: Coordinate,
}

pub enum NavigationInput {
    Start(StartRequest),
    Sample {
        generation: Generation,
        reading: PositionReading,
    },
    /// The provider failed, either while delivering or when asked to subscribe.
    ProviderFailed {
        generation: Generation,
        error: ProviderError,
    },
    Stop,
    Reset,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutput {
    /// Start delivering samples tagged with `generation`.
    Subscribe { generation: Generation },
    /// Stop delivering samples tagged with `generation`.
    Unsubscribe { generation: Generation },
    Event(NavigationEvent),
}

/// Point-in-time view of the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationSnapshot {
    pub state: NavigationState,
    pub generation: Generation,
    pub session_id: Option<SessionId>,
    pub current_step_index: Option<usize>,
    pub progress: Option<Progress>,
}

#[derive(Debug)]
pub struct NavigationMachine {
    state: NavigationState,
    session: Option<NavigationSession>,
    generation: Generation,
    arrival_threshold_m: f64,
    pending: VecDeque<NavigationOutput>,
}

impl NavigationMachine {
    pub fn new(arrival_threshold_m: f64) -> Self {
        Self {
            state: NavigationState::Idle,
            session: None,
            generation: Generation::default(),
            arrival_threshold_m,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn session(&self) -> Option<&NavigationSession> {
        self.session.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn arrival_threshold_m(&self) -> f64 {
        self.arrival_threshold_m
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            state: self.state,
            generation: self.generation,
            session_id: self.session.as_ref().map(|s| s.id),
            current_step_index: self.session.as_ref().map(|s| s.current_step_index),
            progress: self.session.as_ref().and_then(|s| s.progress.clone()),
        }
    }

    fn start(&mut self, request: StartRequest) {
        if self.state != NavigationState::Idle {
            info!(state = ?self.state, "Ending current session before restart");
            self.end_session();
        }

        let generation = self.generation.bump();
        info!(
            session_id = %request.session_id,
            %generation,
            mode = %request.mode,
            points = request.route.polyline().len(),
            steps = request.route.steps().len(),
            "Navigation started"
        );

        self.session = Some(NavigationSession::new(
            request.session_id,
            request.route,
            request.mode,
            request.destination,
            generation,
        ));
        self.state = NavigationState::Navigating;
        self.pending.push_back(NavigationOutput::Subscribe { generation });
    }

    fn stop(&mut self) {
        if self.state == NavigationState::Idle {
            debug!("Stop while idle ignored");
            return;
        }
        self.end_session();
    }

    fn reset(&mut self) {
        if self.state == NavigationState::Idle {
            debug!("Reset while idle ignored");
            return;
        }
        self.end_session();
    }

    /// Drop the session, release its subscription, and invalidate its generation.
    fn end_session(&mut self) {
        if let Some(session) = self.session.take() {
            if session.subscribed {
                self.pending.push_back(NavigationOutput::Unsubscribe {
                    generation: session.generation,
                });
            }
            let generation = self.generation.bump();
            info!(session_id = %session.id, %generation, "Navigation session ended");
        }
        self.state = NavigationState::Idle;
    }

    fn is_live(&self, generation: Generation) -> bool {
        self.state == NavigationState::Navigating && generation == self.generation
    }

    fn on_sample(&mut self, generation: Generation, reading: PositionReading) {
        if !self.is_live(generation) {
            debug!(%generation, current = %self.generation, state = ?self.state, "Discarding stale sample");
            return;
        }

        let sample = match PositionSample::try_from(reading) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, "Dropping malformed sample");
                return;
            }
        };

        let threshold = self.arrival_threshold_m;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let route = Arc::clone(&session.route);

        let matched = match match_position(route.polyline(), sample.coordinate) {
            Ok(index) => index,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Cannot match sample");
                return;
            }
        };
        let Some(selected) = active_step_index(route.steps(), matched) else {
            return;
        };
        let progress = match Progress::compute(route.polyline(), matched, session.mode) {
            Ok(progress) => progress,
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "Cannot compute progress");
                return;
            }
        };

        if is_arrived(sample.coordinate, session.destination, threshold) {
            self.arrive();
            return;
        }

        let current = session.current_step_index;
        // Falling back more than one step is treated as noise or an off-route jump.
        let accepted = if selected + 1 < current {
            debug!(
                session_id = %session.id,
                matched,
                selected,
                current,
                "Rejected step regression"
            );
            current
        } else {
            selected
        };

        if accepted != current || !session.announced {
            session.current_step_index = accepted;
            session.announced = true;
            if let Some(step) = route.step(accepted) {
                info!(
                    session_id = %session.id,
                    step_index = accepted,
                    instruction = %step.instruction,
                    "Step changed"
                );
                self.pending.push_back(NavigationOutput::Event(NavigationEvent::StepChanged {
                    session_id: session.id,
                    step_index: accepted,
                    new_step: step.clone(),
                }));
            }
        }

        debug!(
            session_id = %session.id,
            matched,
            remaining_m = progress.remaining_m,
            eta_s = progress.eta_s,
            "Progress"
        );
        if let Some(step) = route.step(session.current_step_index) {
            let update =
                ProgressUpdate::new(session.id, session.current_step_index, step.clone(), &progress);
            self.pending
                .push_back(NavigationOutput::Event(NavigationEvent::ProgressUpdate(update)));
        }
        session.progress = Some(progress);
    }

    fn arrive(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.progress = None;
        if session.subscribed {
            session.subscribed = false;
            self.pending.push_back(NavigationOutput::Unsubscribe {
                generation: session.generation,
            });
        }
        self.state = NavigationState::Arrived;

        info!(session_id = %session.id, "Arrived at destination");
        self.pending.push_back(NavigationOutput::Event(NavigationEvent::Arrived {
            session_id: session.id,
        }));
    }

    fn on_provider_failed(&mut self, generation: Generation, error: ProviderError) {
        if !self.is_live(generation) {
            debug!(%generation, error = %error, "Discarding stale provider failure");
            return;
        }
        let Some(session_id) = self.session.as_ref().map(|s| s.id) else {
            return;
        };

        warn!(%session_id, error = %error, "Location provider failed, navigation stopped");
        self.end_session();
        self.pending.push_back(NavigationOutput::Event(NavigationEvent::NavigationError {
            session_id,
            kind: NavigationErrorKind::Provider(error),
        }));
    }
}

impl Default for NavigationMachine {
    fn default() -> Self {
        Self::new(DEFAULT_ARRIVAL_THRESHOLD_M)
    }
}

impl StateMachine for NavigationMachine {
    type Input = NavigationInput;
    type Output = NavigationOutput;

    fn process_input(&mut self, input: Self::Input) {
        match input {
            NavigationInput::Start(request) => self.start(request),
            NavigationInput::Sample { generation, reading } => self.on_sample(generation, reading),
            NavigationInput::ProviderFailed { generation, error } => {
                self.on_provider_failed(generation, error)
            }
            NavigationInput::Stop => self.stop(),
            NavigationInput::Reset => self.reset(),
        }
    }

    fn poll_output(&mut self) -> Option<Self::Output> {
        self.pending.pop_front()
    }
}
