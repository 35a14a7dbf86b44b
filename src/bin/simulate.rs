use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures::StreamExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use route_guidance::directions::mapbox::parse_directions;
use route_guidance::directions::{DirectionsResponse, DirectionsStep, FixedDirections};
use route_guidance::location::{ChannelLocationProvider, PositionReading, WatchOptions};
use route_guidance::planner::plan_route;
use route_guidance::{Coordinate, NavigationEvent, Navigator, NavigatorConfig, TransportMode};
use tokio::time::interval;
use tracing::{info, warn};

/// Per-axis GPS noise, roughly 5 m.
const JITTER_DEG: f64 = 0.00005;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let seed: u64 = env_or("SIM_SEED", 7)?;
    let interval_ms: u64 = env_or("SIM_INTERVAL_MS", 250)?;
    let mode = match std::env::var("SIM_MODE") {
        Ok(label) => {
            TransportMode::from_label(&label).ok_or_else(|| anyhow!("unknown SIM_MODE '{label}'"))?
        }
        Err(_) => TransportMode::default(),
    };

    let response = match std::env::var("SIM_ROUTE_JSON") {
        Ok(path) => {
            let body = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {path}"))?;
            parse_directions(&body)?
        }
        Err(_) => demo_response(),
    };
    let origin = *response.polyline.first().context("route has no coordinates")?;
    let destination = *response.polyline.last().context("route has no coordinates")?;

    let provider = Arc::new(ChannelLocationProvider::new());
    provider.push(PositionReading::at(origin, 0)).await;

    let planned = plan_route(
        &*provider,
        &FixedDirections::new(response),
        destination,
        mode,
        &WatchOptions::default(),
    )
    .await?;
    let route = Arc::new(planned.route);

    info!(
        seed,
        interval_ms,
        %mode,
        distance = %route.summary().distance_text(),
        duration = %route.summary().duration_text(),
        "Simulated trip ready"
    );

    let (handle, mut events) = Navigator::spawn(Arc::clone(&provider), NavigatorConfig::default());
    let session_id = handle.start(Arc::clone(&route), mode, destination).await?;
    handle.snapshot().await?;
    info!(%session_id, "Navigation session started");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut ticker = interval(Duration::from_millis(interval_ms));
    let mut index = 0;
    let mut timestamp_ms = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let target = route.polyline()[index.min(route.last_index())];
                let position = Coordinate::new(
                    target.longitude + rng.random_range(-JITTER_DEG..JITTER_DEG),
                    target.latitude + rng.random_range(-JITTER_DEG..JITTER_DEG),
                );
                timestamp_ms += interval_ms;
                provider
                    .push(PositionReading::at(position, timestamp_ms).with_accuracy(5.0))
                    .await;
                index += 1;
            }

            event = events.next() => match event {
                Some(NavigationEvent::StepChanged { step_index, new_step, .. }) => {
                    info!(
                        step_index,
                        icon = new_step.icon_key,
                        instruction = %new_step.instruction,
                        "Next maneuver"
                    );
                }
                Some(NavigationEvent::ProgressUpdate(update)) => {
                    info!(
                        step_index = update.step_index,
                        matched = update.matched_index,
                        remaining = %update.remaining_distance_text,
                        eta = %update.eta_text,
                        "Progress"
                    );
                }
                Some(NavigationEvent::Arrived { session_id }) => {
                    info!(%session_id, samples = index, "Arrived at destination");
                    break;
                }
                Some(NavigationEvent::NavigationError { kind, .. }) => {
                    bail!("navigation failed: {kind:?}");
                }
                None => {
                    warn!("Navigator stopped before arrival");
                    bail!("navigator stopped unexpectedly");
                }
            }
        }
    }

    handle.reset().await?;
    Ok(())
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(value) => value.parse().with_context(|| format!("invalid {key}")),
        Err(_) => Ok(default),
    }
}

/// East along Central Park South, then north up Fifth Avenue.
fn demo_response() -> DirectionsResponse {
    let start = Coordinate::new(-73.9790, 40.7651);
    let corner: usize = 10;

    let polyline: Vec<Coordinate> = (0..=20)
        .map(|i| {
            let east = i.min(corner) as f64 * 0.0005;
            let north = i.saturating_sub(corner) as f64 * 0.0005;
            Coordinate::new(start.longitude + east, start.latitude + north)
        })
        .collect();

    let step = |instruction: &str, kind: &str, modifier: Option<&str>, at: usize, distance_m: f64| {
        DirectionsStep {
            instruction: instruction.to_string(),
            maneuver_type: kind.to_string(),
            maneuver_modifier: modifier.map(str::to_string),
            distance_m,
            duration_s: distance_m / TransportMode::Driving.average_speed_mps(),
            maneuver_location: polyline[at],
        }
    };

    let steps = vec![
        step("Head east on Central Park South", "depart", None, 0, 421.0),
        step("Turn left onto 5th Avenue", "turn", Some("left"), corner, 556.0),
        step("You have arrived at your destination", "arrive", None, 20, 0.0),
    ];

    DirectionsResponse {
        distance_m: 977.0,
        duration_s: 977.0 / TransportMode::Driving.average_speed_mps(),
        polyline,
        steps,
    }
}
