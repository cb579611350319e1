//! Error types for tunnel validation operations.
//!
//! Provides the error taxonomy shared by the whole pipeline: configuration
//! problems, unsupported algorithm families, illegal tunnel state
//! transitions, and inconsistent metrics assembly. Every failure is a
//! distinct named condition so the reporting layer can say exactly which
//! checklist step could not be evaluated.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use thiserror::Error;

use crate::state::{TunnelEvent, TunnelState};

/// Errors that can occur while simulating or validating a tunnel run.
///
/// None of these conditions is transient: every simulated step is a pure
/// computation, so the engine performs no retries and surfaces each failure
/// immediately to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Bad or missing profile/criteria configuration. Always fatal to the
    /// run and surfaced before any partial evaluation takes place.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The requested algorithm family is not supported by the selected
    /// key-exchange backend.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// An illegal tunnel state transition was attempted. Indicates a logic
    /// defect in state-machine usage; never silently corrected.
    #[error("Invalid tunnel transition: {state} cannot accept {event}")]
    InvalidTransition {
        /// State the machine was in when the event arrived.
        state: TunnelState,
        /// Event that was rejected.
        event: TunnelEvent,
    },

    /// Metrics assembly would produce an internally inconsistent record,
    /// e.g. a latency sample attributed to a tunnel that never came up.
    #[error("Incomplete data: {0}")]
    IncompleteData(String),

    /// A cryptographic backend operation failed.
    #[error("Key exchange failed: {0}")]
    KeyExchangeFailed(String),
}

/// A specialized Result type for tunnel validation operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_configuration() {
        let err = CoreError::ConfigurationError("missing latency band".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing latency band");
    }

    #[test]
    fn test_error_display_unsupported_algorithm() {
        let err = CoreError::UnsupportedAlgorithm("frodo-kem".to_string());
        assert!(err.to_string().contains("frodo-kem"));
    }

    #[test]
    fn test_error_display_invalid_transition() {
        let err = CoreError::InvalidTransition {
            state: TunnelState::Failed,
            event: TunnelEvent::HandshakeStarted,
        };
        let rendered = err.to_string();
        assert!(rendered.contains("FAILED"), "state should render: {rendered}");
        assert!(rendered.contains("handshake-started"), "event should render: {rendered}");
    }

    #[test]
    fn test_errors_are_comparable() {
        let a = CoreError::IncompleteData("no network sample".to_string());
        let b = CoreError::IncompleteData("no network sample".to_string());
        assert_eq!(a, b);
    }
}
