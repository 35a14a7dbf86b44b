//! Immutable route representation: a polyline plus the maneuver steps laid over it.

use crate::geo::Coordinate;
use crate::progress::{format_distance, format_duration};

use self::error::{EmptyRoute, RouteError};

pub mod error;
pub mod maneuver;
pub mod matcher;
pub mod step;

pub use self::matcher::match_position;
pub use self::step::{active_step_index, select_active_step};

/// A single turn-by-turn instruction bound to a polyline index.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStep {
    /// First polyline index covered by this step.
    pub start_index: usize,
    pub instruction: String,
    pub maneuver_type: String,
    pub maneuver_modifier: Option<String>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub icon_key: &'static str,
}

/// Totals reported by the directions service for the whole route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteSummary {
    pub distance_m: f64,
    pub duration_s: f64,
}

impl RouteSummary {
    pub fn distance_text(&self) -> String {
        format_distance(self.distance_m)
    }

    pub fn duration_text(&self) -> String {
        format_duration(self.duration_s)
    }
}

/// An ordered polyline and the sorted steps partitioning it.
///
/// Construction validates that the polyline is non-empty and every vertex is a valid position,
/// that there is at least one step, that the first step starts at index 0, and that step start
/// indices are strictly ascending and in range. A `RouteModel` is never mutated afterwards and
/// can be shared between sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteModel {
    polyline: Vec<Coordinate>,
    steps: Vec<NavigationStep>,
    summary: RouteSummary,
}

impl RouteModel {
    /// Build a route from its polyline and steps.
    pub fn new(polyline: Vec<Coordinate>, steps: Vec<NavigationStep>) -> Result<Self, RouteError> {
        if polyline.is_empty() {
            return Err(EmptyRoute.into());
        }

        if let Some(index) = polyline.iter().position(|c| !c.is_valid()) {
            return Err(RouteError::InvalidCoordinate { index });
        }

        let first = steps.first().ok_or(RouteError::NoSteps)?;
        if first.start_index != 0 {
            return Err(RouteError::FirstStepNotAtStart {
                start_index: first.start_index,
            });
        }

        for (step, pair) in steps.windows(2).enumerate() {
            if pair[1].start_index <= pair[0].start_index {
                return Err(RouteError::StepsNotAscending {
                    step: step + 1,
                    start_index: pair[1].start_index,
                });
            }
        }

        // Ascending order means only the last step can run past the polyline.
        if let Some(last) = steps.last()
            && last.start_index >= polyline.len()
        {
            return Err(RouteError::StepOutOfRange {
                step: steps.len() - 1,
                start_index: last.start_index,
                len: polyline.len(),
            });
        }

        Ok(Self {
            polyline,
            steps,
            summary: RouteSummary::default(),
        })
    }

    /// Attach the provider's route totals.
    pub fn with_summary(mut self, summary: RouteSummary) -> Self {
        self.summary = summary;
        self
    }

    pub fn polyline(&self) -> &[Coordinate] {
        &self.polyline
    }

    pub fn steps(&self) -> &[NavigationStep] {
        &self.steps
    }

    pub fn summary(&self) -> RouteSummary {
        self.summary
    }

    pub fn step(&self, index: usize) -> Option<&NavigationStep> {
        self.steps.get(index)
    }

    pub fn last_index(&self) -> usize {
        self.polyline.len() - 1
    }

    /// Final polyline coordinate.
    pub fn end(&self) -> Coordinate {
        self.polyline[self.last_index()]
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::route::maneuver::icon_key;

    /// A straight polyline of `n` vertices along the equator, ~111 m apart.
    pub(crate) fn equator_polyline(n: usize) -> Vec<Coordinate> {
        (0..n)
            .map(|i| Coordinate::new(i as f64 * 0.001, 0.0))
            .collect()
    }

    pub(crate) fn step_at(start_index: usize, maneuver_type: &str, modifier: Option<&str>) -> NavigationStep {
        NavigationStep {
            start_index,
            instruction: format!("{maneuver_type} at {start_index}"),
            maneuver_type: maneuver_type.to_string(),
            maneuver_modifier: modifier.map(str::to_string),
            distance_m: 0.0,
            duration_s: 0.0,
            icon_key: icon_key(maneuver_type, modifier),
        }
    }

    /// 12 vertices with steps starting at 0, 3 and 7.
    pub(crate) fn three_step_route() -> RouteModel {
        RouteModel::new(
            equator_polyline(12),
            vec![
                step_at(0, "depart", None),
                step_at(3, "turn", Some("left")),
                step_at(7, "turn", Some("right")),
            ],
        )
        .expect("valid route")
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_valid_route() {
        let route = three_step_route();
        assert_eq!(route.polyline().len(), 12);
        assert_eq!(route.steps().len(), 3);
        assert_eq!(route.last_index(), 11);
        assert_eq!(route.end(), Coordinate::new(11.0 * 0.001, 0.0));
    }

    #[test]
    fn test_empty_polyline() {
        let result = RouteModel::new(vec![], vec![step_at(0, "depart", None)]);
        assert_eq!(result, Err(RouteError::EmptyRoute(EmptyRoute)));
    }

    #[test]
    fn test_invalid_vertex() {
        let mut polyline = equator_polyline(6);
        polyline[0] = Coordinate::new(f64::NAN, 0.0);
        let result = RouteModel::new(polyline, vec![step_at(0, "depart", None)]);
        assert_eq!(result, Err(RouteError::InvalidCoordinate { index: 0 }));

        let mut polyline = equator_polyline(6);
        polyline[4] = Coordinate::new(0.004, 91.0);
        let result = RouteModel::new(polyline, vec![step_at(0, "depart", None)]);
        assert_eq!(result, Err(RouteError::InvalidCoordinate { index: 4 }));
    }

    #[test]
    fn test_no_steps() {
        let result = RouteModel::new(equator_polyline(3), vec![]);
        assert_eq!(result, Err(RouteError::NoSteps));
    }

    #[test]
    fn test_first_step_must_start_at_zero() {
        let result = RouteModel::new(equator_polyline(3), vec![step_at(1, "depart", None)]);
        assert!(matches!(result, Err(RouteError::FirstStepNotAtStart { start_index: 1 })));
    }

    #[test]
    fn test_steps_must_ascend() {
        let result = RouteModel::new(
            equator_polyline(5),
            vec![
                step_at(0, "depart", None),
                step_at(3, "turn", Some("left")),
                step_at(3, "arrive", None),
            ],
        );
        assert!(matches!(result, Err(RouteError::StepsNotAscending { step: 2, start_index: 3 })));
    }

    #[test]
    fn test_step_out_of_range() {
        let result = RouteModel::new(
            equator_polyline(3),
            vec![step_at(0, "depart", None), step_at(3, "arrive", None)],
        );
        assert!(matches!(result, Err(RouteError::StepOutOfRange { step: 1, start_index: 3, len: 3 })));
    }

    #[test]
    fn test_single_point_route() {
        let route = RouteModel::new(equator_polyline(1), vec![step_at(0, "arrive", None)]).unwrap();
        assert_eq!(route.last_index(), 0);
    }

    #[test]
    fn test_summary_text() {
        let route = three_step_route().with_summary(RouteSummary {
            distance_m: 1500.0,
            duration_s: 5400.0,
        });
        assert_eq!(route.summary().distance_text(), "1.5km");
        assert_eq!(route.summary().duration_text(), "1h 30min");
    }
}
