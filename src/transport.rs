use std::fmt;

/// The means of travel a route was computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportMode {
    #[default]
    Driving,
    Walking,
    Cycling,
    Transit,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Driving,
        TransportMode::Walking,
        TransportMode::Cycling,
        TransportMode::Transit,
    ];

    /// Fixed average speed in metres per second, used for ETA estimates.
    pub fn average_speed_mps(self) -> f64 {
        match self {
            TransportMode::Driving => 13.89,
            TransportMode::Walking => 1.4,
            TransportMode::Cycling => 4.17,
            TransportMode::Transit => 8.33,
        }
    }

    /// Routing profile name understood by the directions service.
    ///
    /// Transit has no dedicated profile and is approximated by traffic-aware driving.
    pub fn profile(self) -> &'static str {
        match self {
            TransportMode::Driving => "driving",
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
            TransportMode::Transit => "driving-traffic",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Driving => "driving",
            TransportMode::Walking => "walking",
            TransportMode::Cycling => "cycling",
            TransportMode::Transit => "transit",
        }
    }

    /// Parse a mode from its [`as_str`](Self::as_str) label.
    pub fn from_label(label: &str) -> Option<TransportMode> {
        Self::ALL.into_iter().find(|mode| mode.as_str() == label)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
