//! The location provider seam: what a provider delivers and how it delivers it.
//!
//! Providers are push based. Navigation hands a provider a [`SampleSink`] when it subscribes;
//! the provider forwards each reading (or failure) into that sink until it is unsubscribed.
//! Every sink is tagged with the [`Generation`] of the session that created it, so readings
//! still in flight after a session ends are recognised and discarded by the navigation task.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use bon::Builder;
use tokio::sync::mpsc;

use crate::geo::Coordinate;
use crate::state_machine::navigation::Generation;

use self::error::{MalformedSample, ProviderError, SinkClosed};

pub mod channel;
pub mod error;

pub use self::channel::ChannelLocationProvider;

/// A reading as the provider reports it. Coordinate fields may be missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionReading {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub heading_deg: Option<f64>,
    pub timestamp_ms: u64,
}

impl PositionReading {
    /// A complete reading at `coordinate` with no accuracy or heading.
    pub fn at(coordinate: Coordinate, timestamp_ms: u64) -> Self {
        Self {
            longitude: Some(coordinate.longitude),
            latitude: Some(coordinate.latitude),
            accuracy_m: None,
            heading_deg: None,
            timestamp_ms,
        }
    }

    pub fn with_accuracy(mut self, accuracy_m: f64) -> Self {
        self.accuracy_m = Some(accuracy_m);
        self
    }

    pub fn with_heading(mut self, heading_deg: f64) -> Self {
        self.heading_deg = Some(heading_deg);
        self
    }
}

/// A validated position sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub coordinate: Coordinate,
    pub accuracy_m: Option<f64>,
    pub heading_deg: Option<f64>,
    pub timestamp_ms: u64,
}

impl TryFrom<PositionReading> for PositionSample {
    type Error = MalformedSample;

    fn try_from(reading: PositionReading) -> Result<Self, Self::Error> {
        let malformed = |reason| MalformedSample {
            timestamp_ms: reading.timestamp_ms,
            reason,
        };

        let longitude = reading.longitude.ok_or_else(|| malformed("missing longitude"))?;
        let latitude = reading.latitude.ok_or_else(|| malformed("missing latitude"))?;

        let coordinate = Coordinate::new(longitude, latitude);
        if !coordinate.is_valid() {
            return Err(malformed("coordinate out of range"));
        }

        Ok(Self {
            coordinate,
            accuracy_m: reading.accuracy_m.filter(|a| a.is_finite()),
            heading_deg: reading.heading_deg.filter(|h| h.is_finite()),
            timestamp_ms: reading.timestamp_ms,
        })
    }
}

/// Options passed to the provider when watching or requesting a position.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct WatchOptions {
    /// Ask the provider for its most precise source.
    #[builder(default = true)]
    pub high_accuracy: bool,

    /// Oldest cached fix the provider may return.
    #[builder(default = Duration::ZERO)]
    pub max_age: Duration,

    /// How long the provider may take to produce a fix.
    #[builder(default = Duration::from_secs(5))]
    pub timeout: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Identifies a live subscription on a provider.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A message queued for the navigation task by a [`SampleSink`].
#[derive(Debug)]
pub(crate) struct SampleMessage {
    pub(crate) generation: Generation,
    pub(crate) payload: Result<PositionReading, ProviderError>,
}

/// The receiving end a provider pushes readings into.
///
/// Holds only a weak reference to the navigation task's queue: a provider that forgets to drop
/// its sinks does not keep the task alive. Sends wait for queue capacity, which is how a
/// provider that outpaces navigation is slowed down.
#[derive(Clone)]
pub struct SampleSink {
    generation: Generation,
    queue: mpsc::WeakSender<SampleMessage>,
}

impl SampleSink {
    pub(crate) fn new(generation: Generation, queue: mpsc::WeakSender<SampleMessage>) -> Self {
        Self { generation, queue }
    }

    /// Generation of the session this sink was created for.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Deliver a reading, waiting for queue capacity.
    pub async fn sample(&self, reading: PositionReading) -> Result<(), SinkClosed> {
        self.deliver(Ok(reading)).await
    }

    /// Deliver a provider failure, waiting for queue capacity.
    pub async fn error(&self, error: ProviderError) -> Result<(), SinkClosed> {
        self.deliver(Err(error)).await
    }

    async fn deliver(&self, payload: Result<PositionReading, ProviderError>) -> Result<(), SinkClosed> {
        let queue = self.queue.upgrade().ok_or(SinkClosed)?;
        queue
            .send(SampleMessage {
                generation: self.generation,
                payload,
            })
            .await
            .map_err(|_| SinkClosed)
    }
}

impl fmt::Debug for SampleSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleSink")
            .field("generation", &self.generation)
            .field("queue", &"<WeakSender>")
            .finish()
    }
}

/// A source of position fixes.
///
/// `subscribe` starts pushing readings into `sink` until `unsubscribe` is called with the
/// returned handle. `unsubscribe` must be idempotent: unknown or already removed handles are
/// ignored.
pub trait LocationProvider: Send + Sync + 'static {
    fn subscribe(
        &self,
        options: &WatchOptions,
        sink: SampleSink,
    ) -> Result<SubscriptionHandle, ProviderError>;

    fn unsubscribe(&self, handle: SubscriptionHandle);

    /// One-shot fix.
    fn current_position(
        &self,
        options: &WatchOptions,
    ) -> impl Future<Output = Result<PositionReading, ProviderError>> + Send;
}
