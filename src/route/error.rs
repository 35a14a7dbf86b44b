//! Error types for route construction and route queries.

/// Indicates that an operation needed at least one polyline coordinate but the route had none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the route polyline has no coordinates")]
pub struct EmptyRoute;

/// Reasons a polyline and step list cannot form a [`RouteModel`](super::RouteModel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    EmptyRoute(#[from] EmptyRoute),

    #[error("polyline coordinate {index} is not a valid position")]
    InvalidCoordinate { index: usize },

    #[error("the route has no navigation steps")]
    NoSteps,

    #[error("the first step starts at index {start_index}, expected 0")]
    FirstStepNotAtStart { start_index: usize },

    #[error("step {step} starts at index {start_index}, not after the previous step")]
    StepsNotAscending { step: usize, start_index: usize },

    #[error("step {step} starts at index {start_index}, beyond the polyline length {len}")]
    StepOutOfRange {
        step: usize,
        start_index: usize,
        len: usize,
    },
}
