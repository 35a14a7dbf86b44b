//! Resolving the active maneuver for a matched polyline index.

use super::NavigationStep;

/// Return the position in `steps` of the step whose range contains `matched_index`.
///
/// `steps` must be sorted ascending by `start_index`. An index before the first step resolves
/// to the first step, an index at or past the last step's start resolves to the last step.
/// Returns `None` only for an empty step list.
pub fn active_step_index(steps: &[NavigationStep], matched_index: usize) -> Option<usize> {
    if steps.is_empty() {
        return None;
    }

    // Number of steps that start at or before the matched index.
    let started = steps.partition_point(|step| step.start_index <= matched_index);
    Some(started.saturating_sub(1))
}

/// Return the step whose range `[start_index, next_start_index)` contains `matched_index`.
pub fn select_active_step(steps: &[NavigationStep], matched_index: usize) -> Option<&NavigationStep> {
    active_step_index(steps, matched_index).map(|index| &steps[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps_at(starts: &[usize]) -> Vec<NavigationStep> {
        starts
            .iter()
            .map(|&start_index| NavigationStep {
                start_index,
                instruction: format!("step at {start_index}"),
                maneuver_type: "turn".to_string(),
                maneuver_modifier: Some("left".to_string()),
                distance_m: 100.0,
                duration_s: 10.0,
                icon_key: "turn_left",
            })
            .collect()
    }

    #[test]
    fn test_empty_steps() {
        assert_eq!(active_step_index(&[], 3), None);
    }

    #[test]
    fn test_ranges() {
        let steps = steps_at(&[0, 3, 7]);
        let expected = [0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2];
        for (matched, want) in expected.into_iter().enumerate() {
            assert_eq!(active_step_index(&steps, matched), Some(want), "index {matched}");
        }
    }

    #[test]
    fn test_before_first_step() {
        // Routes built through `RouteModel` always start at 0, but the selector itself
        // clamps to the first step.
        let steps = steps_at(&[2, 5]);
        assert_eq!(active_step_index(&steps, 0), Some(0));
        assert_eq!(active_step_index(&steps, 1), Some(0));
    }

    #[test]
    fn test_past_last_step() {
        let steps = steps_at(&[0, 4]);
        assert_eq!(active_step_index(&steps, 4), Some(1));
        assert_eq!(active_step_index(&steps, 400), Some(1));
    }

    #[test]
    fn test_select_returns_step() {
        let steps = steps_at(&[0, 3, 7]);
        let step = select_active_step(&steps, 5).unwrap();
        assert_eq!(step.start_index, 3);
    }
}
