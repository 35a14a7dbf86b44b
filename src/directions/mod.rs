//! The directions service seam and conversion of its answers into a [`RouteModel`].

use std::future::Future;

use tracing::{debug, warn};

use crate::geo::Coordinate;
use crate::route::error::RouteError;
use crate::route::maneuver::icon_key;
use crate::route::matcher::nearest_in;
use crate::route::{NavigationStep, RouteModel, RouteSummary};
use crate::transport::TransportMode;

use self::error::RouteComputeError;

pub mod error;
pub mod fixed;
pub mod mapbox;

pub use self::fixed::FixedDirections;

/// One maneuver as reported by the directions service.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsStep {
    pub instruction: String,
    pub maneuver_type: String,
    pub maneuver_modifier: Option<String>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub maneuver_location: Coordinate,
}

/// A computed route as reported by the directions service.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsResponse {
    pub distance_m: f64,
    pub duration_s: f64,
    pub polyline: Vec<Coordinate>,
    pub steps: Vec<DirectionsStep>,
}

impl DirectionsResponse {
    /// Bind every maneuver to a polyline index and build the route model.
    ///
    /// The first maneuver always starts at index 0. Each later maneuver is bound to the nearest
    /// polyline coordinate after the previous maneuver's index, so start indices stay strictly
    /// ascending even on routes that pass the same place twice. Maneuvers left without a fresh
    /// index at the end of the polyline are dropped.
    pub fn into_route(self) -> Result<RouteModel, RouteError> {
        let DirectionsResponse {
            distance_m,
            duration_s,
            polyline,
            steps,
        } = self;

        let mut bound: Vec<NavigationStep> = Vec::with_capacity(steps.len());
        for (position, step) in steps.into_iter().enumerate() {
            let start_index = match bound.last() {
                None => 0,
                Some(previous) => {
                    match nearest_in(&polyline, step.maneuver_location, previous.start_index + 1..polyline.len()) {
                        Some(index) => index,
                        None => {
                            warn!(
                                step = position,
                                location = %step.maneuver_location,
                                "No polyline index left for maneuver, dropping it"
                            );
                            continue;
                        }
                    }
                }
            };

            debug!(step = position, start_index, "Bound maneuver to polyline");
            bound.push(NavigationStep {
                start_index,
                icon_key: icon_key(&step.maneuver_type, step.maneuver_modifier.as_deref()),
                instruction: step.instruction,
                maneuver_type: step.maneuver_type,
                maneuver_modifier: step.maneuver_modifier,
                distance_m: step.distance_m,
                duration_s: step.duration_s,
            });
        }

        Ok(RouteModel::new(polyline, bound)?.with_summary(RouteSummary {
            distance_m,
            duration_s,
        }))
    }
}

/// A source of routes between two coordinates.
///
/// Requests are one-shot and are not retried on failure.
pub trait DirectionsProvider: Send + Sync {
    fn request_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        mode: TransportMode,
    ) -> impl Future<Output = Result<DirectionsResponse, RouteComputeError>> + Send;
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn step(maneuver_type: &str, modifier: Option<&str>, location: Coordinate) -> DirectionsStep {
        DirectionsStep {
            instruction: format!("{maneuver_type} {}", modifier.unwrap_or_default()),
            maneuver_type: maneuver_type.to_string(),
            maneuver_modifier: modifier.map(str::to_string),
            distance_m: 100.0,
            duration_s: 20.0,
            maneuver_location: location,
        }
    }

    /// Six points along the equator with depart, one turn at index 3, and arrive.
    pub(crate) fn straight_response() -> DirectionsResponse {
        let polyline: Vec<Coordinate> = (0..6)
            .map(|i| Coordinate::new(i as f64 * 0.001, 0.0))
            .collect();
        DirectionsResponse {
            distance_m: 555.0,
            duration_s: 80.0,
            steps: vec![
                step("depart", None, polyline[0]),
                step("turn", Some("left"), polyline[3]),
                step("arrive", None, polyline[5]),
            ],
            polyline,
        }
    }
}
