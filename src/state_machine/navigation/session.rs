use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::geo::Coordinate;
use crate::progress::Progress;
use crate::route::RouteModel;
use crate::transport::TransportMode;

/// Identifies one navigation session from `start` until it ends.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter tagging every location subscription.
///
/// Bumped whenever a session starts or ends, so a tag from an earlier subscription never
/// matches the live one.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn bump(&mut self) -> Generation {
        self.0 += 1;
        *self
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Everything the navigation machine tracks for one trip.
#[derive(Debug, Clone)]
pub struct NavigationSession {
    pub id: SessionId,
    pub route: Arc<RouteModel>,
    pub mode: TransportMode,
    pub destination: Coordinate,
    pub current_step_index: usize,
    pub generation: Generation,
    /// Figures from the last accepted sample. Cleared on arrival.
    pub progress: Option<Progress>,
    /// Whether the current step has been announced with a step change yet.
    pub(crate) announced: bool,
    pub(crate) subscribed: bool,
}

impl NavigationSession {
    pub(crate) fn new(
        id: SessionId,
        route: Arc<RouteModel>,
        mode: TransportMode,
        destination: Coordinate,
        generation: Generation,
    ) -> Self {
        Self {
            id,
            route,
            mode,
            destination,
            current_step_index: 0,
            generation,
            progress: None,
            announced: false,
            subscribed: true,
        }
    }
}
