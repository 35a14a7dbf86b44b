//! Request URLs for, and responses from, the Mapbox Directions API (v5).
//!
//! Only the codec lives here; performing the HTTP request is left to the caller's client.

use serde::Deserialize;
use url::Url;

use super::error::RouteComputeError;
use super::{DirectionsResponse, DirectionsStep};
use crate::geo::Coordinate;
use crate::transport::TransportMode;

pub const DEFAULT_BASE_URL: &str = "https://api.mapbox.com/";

/// Build the directions request URL for a two-point route with steps and GeoJSON geometry.
pub fn directions_url(
    base: &Url,
    access_token: &str,
    origin: Coordinate,
    destination: Coordinate,
    mode: TransportMode,
) -> Result<Url, url::ParseError> {
    let path = format!(
        "directions/v5/mapbox/{}/{},{};{},{}",
        mode.profile(),
        origin.longitude,
        origin.latitude,
        destination.longitude,
        destination.latitude,
    );

    let mut url = base.join(&path)?;
    url.query_pairs_mut()
        .append_pair("steps", "true")
        .append_pair("geometries", "geojson")
        .append_pair("access_token", access_token);
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    routes: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
struct RawRoute {
    distance: f64,
    duration: f64,
    geometry: RawGeometry,
    #[serde(default)]
    legs: Vec<RawLeg>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct RawLeg {
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Deserialize)]
struct RawStep {
    distance: f64,
    duration: f64,
    maneuver: RawManeuver,
}

#[derive(Debug, Deserialize)]
struct RawManeuver {
    #[serde(default)]
    instruction: String,
    #[serde(rename = "type")]
    kind: String,
    modifier: Option<String>,
    location: [f64; 2],
}

/// Decode a directions response body, keeping the first route.
pub fn parse_directions(body: &str) -> Result<DirectionsResponse, RouteComputeError> {
    let raw: RawResponse = serde_json::from_str(body)?;

    match raw.code.as_deref() {
        None | Some("Ok") => {}
        Some("NoRoute") => return Err(RouteComputeError::NoRoute),
        Some(code) => {
            return Err(RouteComputeError::Service(
                raw.message.unwrap_or_else(|| code.to_string()),
            ));
        }
    }

    let route = raw
        .routes
        .into_iter()
        .next()
        .ok_or(RouteComputeError::NoRoute)?;

    let steps = route
        .legs
        .into_iter()
        .flat_map(|leg| leg.steps)
        .map(|step| DirectionsStep {
            instruction: step.maneuver.instruction,
            maneuver_type: step.maneuver.kind,
            maneuver_modifier: step.maneuver.modifier,
            distance_m: step.distance,
            duration_s: step.duration,
            maneuver_location: step.maneuver.location.into(),
        })
        .collect();

    Ok(DirectionsResponse {
        distance_m: route.distance,
        duration_s: route.duration,
        polyline: route
            .geometry
            .coordinates
            .into_iter()
            .map(Coordinate::from)
            .collect(),
        steps,
    })
}
