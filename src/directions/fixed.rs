use tracing::debug;

use super::error::RouteComputeError;
use super::{DirectionsProvider, DirectionsResponse};
use crate::geo::Coordinate;
use crate::transport::TransportMode;

/// A directions provider that answers every request with the same canned outcome.
#[derive(Debug, Clone)]
pub struct FixedDirections {
    outcome: Result<DirectionsResponse, String>,
}

impl FixedDirections {
    pub fn new(response: DirectionsResponse) -> Self {
        Self {
            outcome: Ok(response),
        }
    }

    /// Fail every request with a service error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
        }
    }
}

impl DirectionsProvider for FixedDirections {
    async fn request_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> Result<DirectionsResponse, RouteComputeError> {
        debug!(%origin, %destination, %mode, "Serving fixed directions");
        self.outcome.clone().map_err(RouteComputeError::Service)
    }
}
