//! Remaining distance, ETA, and the user-facing text for both.

use crate::geo::{Coordinate, haversine_m};
use crate::route::error::EmptyRoute;
use crate::transport::TransportMode;

/// Sum of the leg lengths from `matched_index` to the end of `polyline`, in metres.
///
/// Returns 0 at (or past) the last index. Fails only when `polyline` is empty.
pub fn remaining_distance(polyline: &[Coordinate], matched_index: usize) -> Result<f64, EmptyRoute> {
    if polyline.is_empty() {
        return Err(EmptyRoute);
    }

    let tail = polyline.get(matched_index..).unwrap_or_default();
    Ok(tail
        .windows(2)
        .map(|leg| haversine_m(leg[0], leg[1]))
        .sum())
}

/// Estimated seconds to cover `remaining_m` at the mode's average speed.
pub fn eta(remaining_m: f64, mode: TransportMode) -> f64 {
    remaining_m / mode.average_speed_mps()
}

/// `"999m"` below one kilometre, `"1.5km"` from one kilometre up.
pub fn format_distance(meters: f64) -> String {
    let meters = meters.max(0.0);
    if meters < 1000.0 {
        format!("{}m", meters.round() as u64)
    } else {
        format!("{:.1}km", meters / 1000.0)
    }
}

/// `"5min"` below one hour, `"1h 30min"` from one hour up. Partial minutes are truncated.
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;

    if hours > 0 {
        format!("{hours}h {minutes}min")
    } else {
        format!("{minutes}min")
    }
}

/// Derived progress figures for one matched position.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub matched_index: usize,
    pub remaining_m: f64,
    pub eta_s: f64,
}

impl Progress {
    pub fn compute(
        polyline: &[Coordinate],
        matched_index: usize,
        mode: TransportMode,
    ) -> Result<Self, EmptyRoute> {
        let remaining_m = remaining_distance(polyline, matched_index)?;
        Ok(Self {
            matched_index,
            remaining_m,
            eta_s: eta(remaining_m, mode),
        })
    }

    pub fn distance_text(&self) -> String {
        format_distance(self.remaining_m)
    }

    pub fn eta_text(&self) -> String {
        format_duration(self.eta_s)
    }
}
