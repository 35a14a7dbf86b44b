//! Turn-by-turn guidance along a precomputed route.
//!
//! Position samples from a [`LocationProvider`](location::LocationProvider) are matched against
//! a [`RouteModel`](route::RouteModel) by a pure
//! [`NavigationMachine`](state_machine::navigation::NavigationMachine), which a
//! [`Navigator`](navigator::Navigator) task drives and turns into
//! [`NavigationEvent`](state_machine::navigation::NavigationEvent)s.

pub mod arrival;
pub mod directions;
pub mod geo;
pub mod location;
pub mod navigator;
pub mod planner;
pub mod progress;
pub mod route;
pub mod state_machine;
pub mod transport;

pub use geo::Coordinate;
pub use navigator::{Navigator, NavigatorConfig, NavigatorHandle};
pub use route::RouteModel;
pub use state_machine::navigation::NavigationEvent;
pub use transport::TransportMode;
