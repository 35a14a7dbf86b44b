use crate::location::error::ProviderError;
use crate::progress::Progress;
use crate::route::NavigationStep;

use super::session::SessionId;

/// Guidance for one accepted sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub session_id: SessionId,
    pub step_index: usize,
    pub active_step: NavigationStep,
    pub matched_index: usize,
    pub remaining_m: f64,
    pub eta_s: f64,
    pub remaining_distance_text: String,
    pub eta_text: String,
}

impl ProgressUpdate {
    pub(crate) fn new(
        session_id: SessionId,
        step_index: usize,
        active_step: NavigationStep,
        progress: &Progress,
    ) -> Self {
        Self {
            session_id,
            step_index,
            active_step,
            matched_index: progress.matched_index,
            remaining_m: progress.remaining_m,
            eta_s: progress.eta_s,
            remaining_distance_text: progress.distance_text(),
            eta_text: progress.eta_text(),
        }
    }
}

/// Why navigation stopped on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationErrorKind {
    Provider(ProviderError),
}

/// Notifications for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationEvent {
    ProgressUpdate(ProgressUpdate),
    StepChanged {
        session_id: SessionId,
        step_index: usize,
        new_step: NavigationStep,
    },
    Arrived {
        session_id: SessionId,
    },
    NavigationError {
        session_id: SessionId,
        kind: NavigationErrorKind,
    },
}
