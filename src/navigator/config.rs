use bon::Builder;

use crate::arrival::DEFAULT_ARRIVAL_THRESHOLD_M;
use crate::location::WatchOptions;

/// Configuration for the [`Navigator`](super::Navigator).
#[derive(Debug, Clone, Builder)]
pub struct NavigatorConfig {
    /// Distance to the destination, in metres, under which the trip counts as finished.
    #[builder(default = DEFAULT_ARRIVAL_THRESHOLD_M)]
    pub arrival_threshold_m: f64,

    /// Options passed to the location provider on subscribe.
    #[builder(default)]
    pub watch: WatchOptions,

    /// Samples that may wait for processing before providers are made to wait.
    #[builder(default = 16)]
    pub sample_queue_capacity: usize,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
