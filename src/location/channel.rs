use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use dashmap::DashMap;
use tracing::{debug, info};

use super::error::{ProviderError, SinkClosed};
use super::{LocationProvider, PositionReading, SampleSink, SubscriptionHandle, WatchOptions};

/// An in-process location provider fed by its owner.
///
/// Live subscriptions are kept in a map keyed by handle. Readings handed to
/// [`push`](Self::push) fan out to every subscriber that is live at that moment, and the
/// latest reading answers [`current_position`](LocationProvider::current_position) requests.
#[derive(Debug)]
pub struct ChannelLocationProvider {
    subscriptions: DashMap<SubscriptionHandle, SampleSink, ahash::RandomState>,
    next_handle: AtomicU64,
    last_reading: Mutex<Option<PositionReading>>,
    denial: Option<ProviderError>,
}

impl ChannelLocationProvider {
    /// Construct a provider with no subscribers and no fix yet.
    pub fn new() -> Self {
        Self {
            subscriptions: DashMap::default(),
            next_handle: AtomicU64::new(1),
            last_reading: Mutex::new(None),
            denial: None,
        }
    }

    /// Construct a provider that refuses every request with `error`.
    pub fn denying(error: ProviderError) -> Self {
        Self {
            denial: Some(error),
            ..Self::new()
        }
    }

    /// Record `reading` as the latest fix and deliver it to every live subscriber.
    ///
    /// Returns the number of subscribers that accepted it.
    pub async fn push(&self, reading: PositionReading) -> usize {
        *self
            .last_reading
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(reading.clone());

        let mut delivered = 0;
        for (handle, sink) in self.snapshot() {
            match sink.sample(reading.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => self.drop_closed(handle, e),
            }
        }
        delivered
    }

    /// Report `error` to every live subscriber.
    pub async fn fail(&self, error: ProviderError) -> usize {
        let mut delivered = 0;
        for (handle, sink) in self.snapshot() {
            match sink.error(error.clone()).await {
                Ok(()) => delivered += 1,
                Err(e) => self.drop_closed(handle, e),
            }
        }
        delivered
    }

    /// Sinks of all live subscriptions.
    pub fn subscribers(&self) -> Vec<SampleSink> {
        self.snapshot().into_iter().map(|(_, sink)| sink).collect()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    // A closed sink never reopens.
    fn drop_closed(&self, handle: SubscriptionHandle, error: SinkClosed) {
        if self.subscriptions.remove(&handle).is_some() {
            debug!(%handle, error = %error, "Subscriber gone, subscription dropped");
        }
    }

    // Clone out of the map so no shard lock is held across an await.
    fn snapshot(&self) -> Vec<(SubscriptionHandle, SampleSink)> {
        let mut live: Vec<_> = self
            .subscriptions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        live.sort_by_key(|(handle, _)| *handle);
        live
    }
}

impl Default for ChannelLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationProvider for ChannelLocationProvider {
    fn subscribe(
        &self,
        options: &WatchOptions,
        sink: SampleSink,
    ) -> Result<SubscriptionHandle, ProviderError> {
        if let Some(error) = &self.denial {
            return Err(error.clone());
        }

        let handle = SubscriptionHandle::new(self.next_handle.fetch_add(1, Ordering::Relaxed));
        info!(
            %handle,
            generation = %sink.generation(),
            high_accuracy = options.high_accuracy,
            "Location subscription added"
        );
        self.subscriptions.insert(handle, sink);
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if self.subscriptions.remove(&handle).is_some() {
            info!(%handle, "Location subscription removed");
        }
    }

    async fn current_position(&self, _options: &WatchOptions) -> Result<PositionReading, ProviderError> {
        if let Some(error) = &self.denial {
            return Err(error.clone());
        }

        self.last_reading
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| ProviderError::Unavailable("no position fix yet".to_string()))
    }
}
