use thiserror::Error;

/// Failures reported by a routing backend or one of its downloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// The backend failed to compute a route.
    #[error("routing backend failed: {0}")]
    Backend(String),

    /// Fetching routing data failed.
    #[error("routing data download failed: {0}")]
    Download(String),

    /// Preparing downloaded routing data failed.
    #[error("routing data processing failed: {0}")]
    Processing(String),

    /// The call noticed its cancellation token and returned early.
    #[error("routing cancelled")]
    Cancelled,
}

impl RoutingError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RoutingError::Cancelled)
    }
}
