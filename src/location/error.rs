//! Error types for location providers and the samples they deliver.

/// A failure reported by the location provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("timed out waiting for a position fix")]
    Timeout,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Indicates a reading that cannot be used as a position sample.
///
/// Malformed readings are dropped; navigation continues with the next one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed position reading at {timestamp_ms}ms: {reason}")]
pub struct MalformedSample {
    pub timestamp_ms: u64,
    pub reason: &'static str,
}

/// Indicates that the navigation task behind a [`SampleSink`](super::SampleSink) has exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the sample sink is closed")]
pub struct SinkClosed;
