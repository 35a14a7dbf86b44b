use crate::route::error::RouteError;

/// Errors that can occur while obtaining a route from the directions service.
#[derive(Debug, thiserror::Error)]
pub enum RouteComputeError {
    /// The request failed or the service answered with an error.
    #[error("directions service error: {0}")]
    Service(String),

    /// The service answered but offered no route.
    #[error("no route found")]
    NoRoute,

    /// The response body could not be decoded.
    #[error("failed to decode directions response")]
    Decode(#[from] serde_json::Error),

    /// The route could not be turned into a navigable model.
    #[error("directions response is not a navigable route")]
    InvalidRoute(#[from] RouteError),
}
