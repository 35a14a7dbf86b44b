//! Snapping a live position onto the route polyline.

use std::ops::Range;

use crate::geo::{Coordinate, haversine_m};

use super::error::EmptyRoute;

/// Return the index of the polyline coordinate nearest to `position`.
///
/// Ties resolve to the smallest index. Fails only when `polyline` is empty.
pub fn match_position(polyline: &[Coordinate], position: Coordinate) -> Result<usize, EmptyRoute> {
    nearest_in(polyline, position, 0..polyline.len()).ok_or(EmptyRoute)
}

/// Nearest-index search restricted to `range`, with the same tie-break as [`match_position`].
///
/// Returns `None` when the range selects no coordinates.
pub fn nearest_in(
    polyline: &[Coordinate],
    position: Coordinate,
    range: Range<usize>,
) -> Option<usize> {
    let start = range.start;
    let window = polyline.get(range)?;

    let mut best: Option<(usize, f64)> = None;
    for (offset, coord) in window.iter().enumerate() {
        let dist = haversine_m(position, *coord);
        // Strict comparison keeps the earliest index on ties.
        if best.is_none_or(|(_, best_dist)| dist < best_dist) {
            best = Some((start + offset, dist));
        }
    }

    best.map(|(index, _)| index)
}
