use crate::geo::{Coordinate, haversine_m};

/// Distance under which the destination counts as reached, in metres.
pub const DEFAULT_ARRIVAL_THRESHOLD_M: f64 = 20.0;

/// `true` iff `position` is strictly closer than `threshold_m` to `destination`.
pub fn is_arrived(position: Coordinate, destination: Coordinate, threshold_m: f64) -> bool {
    haversine_m(position, destination) < threshold_m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_destination() {
        let dest = Coordinate::new(-73.9654, 40.7829);
        assert!(is_arrived(dest, dest, DEFAULT_ARRIVAL_THRESHOLD_M));
    }

    #[test]
    fn test_threshold_is_strict() {
        let dest = Coordinate::new(0.0, 0.0);
        let position = Coordinate::new(0.0001, 0.0001);
        let dist = haversine_m(position, dest);

        assert!(!is_arrived(position, dest, dist));
        assert!(is_arrived(position, dest, dist + 1.0));
        assert!(!is_arrived(position, dest, dist - 1.0));
    }

    #[test]
    fn test_far_away() {
        let dest = Coordinate::new(0.0, 0.0);
        assert!(!is_arrived(Coordinate::new(0.001, 0.0), dest, DEFAULT_ARRIVAL_THRESHOLD_M));
    }
}
