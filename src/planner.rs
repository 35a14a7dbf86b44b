//! Obtaining a route from the current position before navigation starts.

use tracing::info;

use crate::directions::DirectionsProvider;
use crate::directions::error::RouteComputeError;
use crate::geo::Coordinate;
use crate::location::error::{MalformedSample, ProviderError};
use crate::location::{LocationProvider, PositionSample, WatchOptions};
use crate::route::RouteModel;
use crate::transport::TransportMode;

/// Errors that can occur while planning a route. No session exists when these are returned.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("could not determine the current position")]
    Location(#[from] ProviderError),

    #[error("the current position fix is unusable")]
    MalformedFix(#[from] MalformedSample),

    #[error("could not compute a route")]
    Route(#[from] RouteComputeError),
}

/// A route ready for navigation and the position it was planned from.
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub mode: TransportMode,
    pub route: RouteModel,
}

/// Take one position fix and request a route from it to `destination`.
///
/// Neither step is retried; the caller decides whether to try again.
pub async fn plan_route<L, D>(
    location: &L,
    directions: &D,
    destination: Coordinate,
    mode: TransportMode,
    options: &WatchOptions,
) -> Result<PlannedRoute, PlanError>
where
    L: LocationProvider,
    D: DirectionsProvider,
{
    let fix = PositionSample::try_from(location.current_position(options).await?)?;
    let origin = fix.coordinate;

    let response = directions.request_route(origin, destination, mode).await?;
    let route = response.into_route().map_err(RouteComputeError::from)?;

    info!(
        %origin,
        %destination,
        %mode,
        points = route.polyline().len(),
        steps = route.steps().len(),
        distance = %route.summary().distance_text(),
        duration = %route.summary().duration_text(),
        "Route planned"
    );

    Ok(PlannedRoute {
        origin,
        destination,
        mode,
        route,
    })
}
