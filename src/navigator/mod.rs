//! The task that owns a [`NavigationMachine`] and connects it to the outside world.
//!
//! ## Message flow
//!
//! - Commands (`start`, `stop`, `reset`, `snapshot`) arrive from [`NavigatorHandle`]s.
//! - Samples arrive from the location provider through [`SampleSink`]s, queued in a bounded
//!   channel of `sample_queue_capacity`. A provider that pushes into a full queue waits.
//! - Events leave on an unbounded stream, so a slow consumer never stalls navigation.
//!
//! The task processes one message at a time and drains every output of the machine before
//! taking the next, so a sample is fully applied before another is looked at. Commands take
//! priority over queued samples: after a `stop`, samples already waiting in the queue are
//! processed with their old generation tag and discarded by the machine.
//!
//! The task ends when every [`NavigatorHandle`] has been dropped, ending any live session first.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::geo::Coordinate;
use crate::location::{LocationProvider, SampleMessage, SampleSink, SubscriptionHandle};
use crate::route::RouteModel;
use crate::state_machine::StateMachine;
use crate::state_machine::navigation::{
    Generation, NavigationEvent, NavigationInput, NavigationMachine, NavigationOutput,
    NavigationSnapshot, SessionId, StartRequest,
};
use crate::transport::TransportMode;

use self::error::NavigatorClosed;

pub mod config;
pub mod error;

pub use self::config::NavigatorConfig;

const COMMAND_CAPACITY: usize = 32;

/// Stream of notifications for the presentation layer.
pub type NavigationEvents = UnboundedReceiverStream<NavigationEvent>;

enum Command {
    Start(StartRequest),
    Stop,
    Reset,
    Snapshot(oneshot::Sender<NavigationSnapshot>),
}

/// Cloneable control surface of a running [`Navigator`].
#[derive(Debug, Clone)]
pub struct NavigatorHandle {
    commands: mpsc::Sender<Command>,
}

impl NavigatorHandle {
    /// Begin guidance along `route` towards `destination`, replacing any current session.
    pub async fn start(
        &self,
        route: Arc<RouteModel>,
        mode: TransportMode,
        destination: Coordinate,
    ) -> Result<SessionId, NavigatorClosed> {
        let session_id = SessionId::generate();
        self.send(Command::Start(StartRequest {
            session_id,
            route,
            mode,
            destination,
        }))
        .await?;
        Ok(session_id)
    }

    /// End the current session. Does nothing when idle.
    pub async fn stop(&self) -> Result<(), NavigatorClosed> {
        self.send(Command::Stop).await
    }

    /// Clear a finished session. Does nothing when idle.
    pub async fn reset(&self) -> Result<(), NavigatorClosed> {
        self.send(Command::Reset).await
    }

    pub async fn snapshot(&self) -> Result<NavigationSnapshot, NavigatorClosed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot(reply)).await?;
        response.await.map_err(|_| NavigatorClosed)
    }

    async fn send(&self, command: Command) -> Result<(), NavigatorClosed> {
        self.commands.send(command).await.map_err(|_| NavigatorClosed)
    }
}

/// Runner for a single navigation machine.
pub struct Navigator<P> {
    machine: NavigationMachine,
    provider: Arc<P>,
    config: NavigatorConfig,
    commands: mpsc::Receiver<Command>,
    samples: mpsc::Receiver<SampleMessage>,
    // Kept so the sample queue stays open while sinks only hold weak senders.
    sample_tx: mpsc::Sender<SampleMessage>,
    events: mpsc::UnboundedSender<NavigationEvent>,
    subscription: Option<(Generation, SubscriptionHandle)>,
}

impl<P: LocationProvider> Navigator<P> {
    /// Build a navigator without running it.
    pub fn new(provider: Arc<P>, config: NavigatorConfig) -> (Self, NavigatorHandle, NavigationEvents) {
        let (command_tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (sample_tx, samples) = mpsc::channel(config.sample_queue_capacity.max(1));
        let (events, event_rx) = mpsc::unbounded_channel();

        let navigator = Self {
            machine: NavigationMachine::new(config.arrival_threshold_m),
            provider,
            config,
            commands,
            samples,
            sample_tx,
            events,
            subscription: None,
        };

        (
            navigator,
            NavigatorHandle {
                commands: command_tx,
            },
            UnboundedReceiverStream::new(event_rx),
        )
    }

    /// Build a navigator and run it on the current tokio runtime.
    pub fn spawn(provider: Arc<P>, config: NavigatorConfig) -> (NavigatorHandle, NavigationEvents) {
        let (navigator, handle, events) = Self::new(provider, config);
        tokio::spawn(navigator.run());
        (handle, events)
    }

    /// Process commands and samples until every handle is dropped.
    pub async fn run(mut self) {
        info!(
            arrival_threshold_m = self.config.arrival_threshold_m,
            sample_queue_capacity = self.config.sample_queue_capacity,
            "Navigator started"
        );

        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },

                Some(message) = self.samples.recv() => self.handle_sample(message),
            }
        }

        self.apply(NavigationInput::Stop);
        info!("All handles dropped, navigator shut down");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start(request) => self.apply(NavigationInput::Start(request)),
            Command::Stop => self.apply(NavigationInput::Stop),
            Command::Reset => self.apply(NavigationInput::Reset),
            Command::Snapshot(reply) => {
                if reply.send(self.machine.snapshot()).is_err() {
                    debug!("Snapshot requester went away");
                }
            }
        }
    }

    fn handle_sample(&mut self, message: SampleMessage) {
        let SampleMessage {
            generation,
            payload,
        } = message;

        let input = match payload {
            Ok(reading) => NavigationInput::Sample {
                generation,
                reading,
            },
            Err(error) => NavigationInput::ProviderFailed { generation, error },
        };
        self.apply(input);
    }

    /// Feed one input and carry out everything it produced.
    fn apply(&mut self, input: NavigationInput) {
        self.machine.process_input(input);

        while let Some(output) = self.machine.poll_output() {
            match output {
                NavigationOutput::Subscribe { generation } => self.subscribe(generation),
                NavigationOutput::Unsubscribe { generation } => self.unsubscribe(generation),
                NavigationOutput::Event(event) => {
                    if self.events.send(event).is_err() {
                        debug!("Event stream dropped, event discarded");
                    }
                }
            }
        }
    }

    fn subscribe(&mut self, generation: Generation) {
        let sink = SampleSink::new(generation, self.sample_tx.downgrade());

        match self.provider.subscribe(&self.config.watch, sink) {
            Ok(handle) => {
                debug!(%generation, %handle, "Subscribed to location provider");
                self.subscription = Some((generation, handle));
            }
            Err(error) => {
                warn!(%generation, error = %error, "Location subscription refused");
                // Outputs of this input are drained by the loop in `apply`.
                self.machine
                    .process_input(NavigationInput::ProviderFailed { generation, error });
            }
        }
    }

    fn unsubscribe(&mut self, generation: Generation) {
        match self.subscription {
            Some((live, handle)) if live == generation => {
                self.provider.unsubscribe(handle);
                self.subscription = None;
                debug!(%generation, %handle, "Unsubscribed from location provider");
            }
            _ => debug!(%generation, "No live subscription to release"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;
    use tokio::time::timeout;

    use super::*;
    use crate::location::error::ProviderError;
    use crate::location::{ChannelLocationProvider, PositionReading};
    use crate::route::test_support::three_step_route;
    use crate::state_machine::navigation::{NavigationErrorKind, NavigationState};

    async fn next_event(events: &mut NavigationEvents) -> NavigationEvent {
        timeout(Duration::from_secs(2), events.next())
            .await
            .expect("event within timeout")
            .expect("event stream open")
    }

    fn reading_at(route: &RouteModel, index: usize) -> PositionReading {
        PositionReading::at(route.polyline()[index], index as u64 * 1_000)
    }

    struct Fixture {
        provider: Arc<ChannelLocationProvider>,
        handle: NavigatorHandle,
        events: NavigationEvents,
        route: Arc<RouteModel>,
    }

    impl Fixture {
        fn new(provider: ChannelLocationProvider) -> Self {
            let provider = Arc::new(provider);
            let (handle, events) = Navigator::spawn(Arc::clone(&provider), NavigatorConfig::default());
            Self {
                provider,
                handle,
                events,
                route: Arc::new(three_step_route()),
            }
        }

        async fn start(&self) -> SessionId {
            let id = self
                .handle
                .start(Arc::clone(&self.route), TransportMode::Walking, self.route.end())
                .await
                .unwrap();
            // Commands are processed in order, so the subscription exists once this returns.
            self.handle.snapshot().await.unwrap();
            id
        }

        async fn push(&self, index: usize) {
            self.provider.push(reading_at(&self.route, index)).await;
        }
    }

    #[tokio::test]
    async fn test_trip_to_arrival() {
        let mut f = Fixture::new(ChannelLocationProvider::new());
        let session_id = f.start().await;
        assert_eq!(f.provider.subscription_count(), 1);

        let mut seen_steps = Vec::new();
        for index in [0, 4, 9] {
            f.push(index).await;
            match next_event(&mut f.events).await {
                NavigationEvent::StepChanged { step_index, .. } => seen_steps.push(step_index),
                other => panic!("expected step change, got {other:?}"),
            }
            match next_event(&mut f.events).await {
                NavigationEvent::ProgressUpdate(update) => {
                    assert_eq!(update.session_id, session_id);
                    assert_eq!(update.matched_index, index);
                }
                other => panic!("expected progress, got {other:?}"),
            }
        }
        assert_eq!(seen_steps, vec![0, 1, 2]);

        f.push(11).await;
        assert_eq!(next_event(&mut f.events).await, NavigationEvent::Arrived { session_id });

        let snapshot = f.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, NavigationState::Arrived);
        assert!(snapshot.progress.is_none());
        assert_eq!(f.provider.subscription_count(), 0);

        // Shutting down closes the stream without any further event.
        drop(f.handle);
        assert!(timeout(Duration::from_secs(2), f.events.next()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stale_sink_after_stop() {
        let mut f = Fixture::new(ChannelLocationProvider::new());
        f.start().await;
        let stale = f.provider.subscribers().remove(0);

        f.push(4).await;
        assert!(matches!(
            next_event(&mut f.events).await,
            NavigationEvent::StepChanged { step_index: 1, .. }
        ));
        next_event(&mut f.events).await;

        f.handle.stop().await.unwrap();
        let snapshot = f.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, NavigationState::Idle);
        assert!(snapshot.session_id.is_none());
        assert_eq!(f.provider.subscription_count(), 0);

        // The old callback fires late, then a new session starts.
        stale.sample(reading_at(&f.route, 9)).await.unwrap();
        let session_id = f.start().await;
        f.push(0).await;

        // Whenever the stale reading is handled, its old generation tag gets it discarded.
        assert_eq!(
            next_event(&mut f.events).await,
            NavigationEvent::StepChanged {
                session_id,
                step_index: 0,
                new_step: f.route.steps()[0].clone(),
            }
        );
        let snapshot = f.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.session_id, Some(session_id));
        assert_eq!(snapshot.current_step_index, Some(0));
    }

    #[tokio::test]
    async fn test_full_sample_queue_makes_provider_wait() {
        let provider = Arc::new(ChannelLocationProvider::new());
        let config = NavigatorConfig::builder().sample_queue_capacity(1).build();
        let (navigator, _handle, _events) = Navigator::new(provider, config);
        let route = three_step_route();

        // Nothing drains the queue because the navigator is not running.
        let sink = SampleSink::new(Generation::new(1), navigator.sample_tx.downgrade());
        sink.sample(reading_at(&route, 0)).await.unwrap();
        let second = timeout(Duration::from_millis(100), sink.sample(reading_at(&route, 4))).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_stop_overtakes_queued_samples() {
        let provider = Arc::new(ChannelLocationProvider::new());
        let (navigator, handle, mut events) = Navigator::new(Arc::clone(&provider), NavigatorConfig::default());
        let route = Arc::new(three_step_route());

        handle
            .start(Arc::clone(&route), TransportMode::Walking, route.end())
            .await
            .unwrap();
        let sink = SampleSink::new(Generation::new(1), navigator.sample_tx.downgrade());
        for index in [0, 4, 9] {
            sink.sample(reading_at(&route, index)).await.unwrap();
        }
        handle.stop().await.unwrap();

        tokio::spawn(navigator.run());

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, NavigationState::Idle);
        assert_eq!(snapshot.generation, Generation::new(2));
        assert_eq!(provider.subscription_count(), 0);
        assert!(timeout(Duration::from_millis(200), events.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_subscription_refused() {
        let mut f = Fixture::new(ChannelLocationProvider::denying(ProviderError::PermissionDenied));
        let session_id = f.start().await;

        assert_eq!(
            next_event(&mut f.events).await,
            NavigationEvent::NavigationError {
                session_id,
                kind: NavigationErrorKind::Provider(ProviderError::PermissionDenied),
            }
        );
        let snapshot = f.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, NavigationState::Idle);
    }

    #[tokio::test]
    async fn test_provider_failure_mid_trip() {
        let mut f = Fixture::new(ChannelLocationProvider::new());
        let session_id = f.start().await;
        f.push(0).await;
        next_event(&mut f.events).await;
        next_event(&mut f.events).await;

        f.provider.fail(ProviderError::Timeout).await;
        assert_eq!(
            next_event(&mut f.events).await,
            NavigationEvent::NavigationError {
                session_id,
                kind: NavigationErrorKind::Provider(ProviderError::Timeout),
            }
        );
        assert_eq!(f.provider.subscription_count(), 0);
        assert_eq!(f.handle.snapshot().await.unwrap().state, NavigationState::Idle);
    }

    #[tokio::test]
    async fn test_stop_twice_is_harmless() {
        let f = Fixture::new(ChannelLocationProvider::new());
        f.handle.stop().await.unwrap();
        f.start().await;
        f.handle.stop().await.unwrap();
        f.handle.stop().await.unwrap();

        let snapshot = f.handle.snapshot().await.unwrap();
        assert_eq!(snapshot.state, NavigationState::Idle);
        assert_eq!(snapshot.generation, Generation::new(2));
    }

    #[tokio::test]
    async fn test_dropping_handles_releases_subscription() {
        let mut f = Fixture::new(ChannelLocationProvider::new());
        f.start().await;
        assert_eq!(f.provider.subscription_count(), 1);

        drop(f.handle);
        assert!(timeout(Duration::from_secs(2), f.events.next()).await.unwrap().is_none());
        assert_eq!(f.provider.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_closed_navigator() {
        let provider = Arc::new(ChannelLocationProvider::new());
        let (navigator, handle, _events) = Navigator::new(provider, NavigatorConfig::default());
        drop(navigator);
        assert_eq!(handle.stop().await, Err(NavigatorClosed));
    }
}
