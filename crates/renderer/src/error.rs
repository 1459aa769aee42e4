use routing::RoutingError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failures surfaced through the engine's routing-error callback.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// A collaborator (map surface, backend, download) panicked.
    #[error("route rendering panicked: {0}")]
    Panicked(String),

    #[error("failed to start render worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RenderError {
    /// `true` for errors that only mean "this request was superseded".
    pub fn is_cancellation(&self) -> bool {
        matches!(self, RenderError::Routing(err) if err.is_cancelled())
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic".to_string()
        };
        RenderError::Panicked(message)
    }
}

#[cfg(test)]
mod tests {
    use routing::RoutingError;

    use super::RenderError;

    #[test]
    fn cancellation_is_recognized() {
        assert!(RenderError::from(RoutingError::Cancelled).is_cancellation());
        assert!(!RenderError::from(RoutingError::Backend("down".into())).is_cancellation());
        assert!(!RenderError::Panicked("x".into()).is_cancellation());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let err = RenderError::from_panic(Box::new("static"));
        assert_eq!(err.to_string(), "route rendering panicked: static");
        let err = RenderError::from_panic(Box::new(String::from("owned")));
        assert_eq!(err.to_string(), "route rendering panicked: owned");
        let err = RenderError::from_panic(Box::new(42u8));
        assert_eq!(err.to_string(), "route rendering panicked: unknown panic");
    }

    #[test]
    fn routing_errors_display_transparently() {
        let err = RenderError::from(RoutingError::Download("404".into()));
        assert_eq!(err.to_string(), "routing data download failed: 404");
    }
}
