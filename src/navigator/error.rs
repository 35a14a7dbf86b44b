/// Indicates that the navigation task has exited and can no longer take commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("the navigator task is no longer running")]
pub struct NavigatorClosed;
