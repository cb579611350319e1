//! Tunnel lifecycle state machine.
//!
//! Models the lifecycle of a simulated tunnel, driven by handshake outcome
//! and network-quality sampling:
//!
//! ```text
//! INIT --handshake-started--> HANDSHAKING
//! HANDSHAKING --completed(matched=true)--> ACTIVE
//! HANDSHAKING --completed(matched=false)--> FAILED   (terminal)
//! ACTIVE --loss > threshold--> DEGRADED
//! DEGRADED --loss <= threshold--> ACTIVE
//! any non-terminal state --abort--> FAILED           (terminal)
//! ```
//!
//! `FAILED` is terminal: advancing it is a logic defect and fails with
//! [`CoreError::InvalidTransition`] rather than silently no-opping.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Default packet-loss fraction above which an active tunnel degrades.
pub const DEFAULT_DEGRADATION_THRESHOLD: f64 = 0.05;

/// Lifecycle states of a simulated tunnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TunnelState {
    /// Created, handshake not yet started.
    Init,
    /// Key exchange in progress.
    Handshaking,
    /// Established and healthy.
    Active,
    /// Established but packet loss exceeds the degradation threshold.
    Degraded,
    /// Handshake failed or run aborted. Terminal.
    Failed,
}

impl TunnelState {
    /// Whether the tunnel is established (traffic can flow).
    #[must_use]
    pub fn is_established(self) -> bool {
        matches!(self, TunnelState::Active | TunnelState::Degraded)
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, TunnelState::Failed)
    }
}

impl fmt::Display for TunnelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelState::Init => write!(f, "INIT"),
            TunnelState::Handshaking => write!(f, "HANDSHAKING"),
            TunnelState::Active => write!(f, "ACTIVE"),
            TunnelState::Degraded => write!(f, "DEGRADED"),
            TunnelState::Failed => write!(f, "FAILED"),
        }
    }
}

/// Events that drive tunnel state transitions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TunnelEvent {
    /// Key exchange has begun.
    HandshakeStarted,
    /// Key exchange finished; `matched` reports key-material integrity.
    HandshakeCompleted {
        /// Whether both endpoints derived identical secrets.
        matched: bool,
    },
    /// A packet-loss fraction (0.0–1.0) was observed on an established tunnel.
    LossObserved(f64),
    /// Explicit abort of the run.
    Abort,
}

impl fmt::Display for TunnelEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelEvent::HandshakeStarted => write!(f, "handshake-started"),
            TunnelEvent::HandshakeCompleted { matched } => {
                write!(f, "handshake-completed(matched={matched})")
            }
            TunnelEvent::LossObserved(loss) => write!(f, "loss-observed({loss})"),
            TunnelEvent::Abort => write!(f, "abort"),
        }
    }
}

/// Tunnel lifecycle state machine.
///
/// `advance` is a pure function of the current state and the event; the
/// struct only carries the current state and the configured degradation
/// threshold. Initial state is always [`TunnelState::Init`].
///
/// # Example
///
/// ```
/// use qtunnel_core::state::{TunnelEvent, TunnelState, TunnelStateMachine};
///
/// let mut machine = TunnelStateMachine::new();
/// machine.advance(TunnelEvent::HandshakeStarted)?;
/// let state = machine.advance(TunnelEvent::HandshakeCompleted { matched: true })?;
/// assert_eq!(state, TunnelState::Active);
/// # Ok::<(), qtunnel_core::error::CoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TunnelStateMachine {
    state: TunnelState,
    degradation_threshold: f64,
}

impl Default for TunnelStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl TunnelStateMachine {
    /// Creates a machine in [`TunnelState::Init`] with the default
    /// degradation threshold.
    #[must_use]
    pub fn new() -> Self {
        Self { state: TunnelState::Init, degradation_threshold: DEFAULT_DEGRADATION_THRESHOLD }
    }

    /// Sets the packet-loss fraction above which an active tunnel degrades.
    #[must_use]
    pub fn with_degradation_threshold(mut self, threshold: f64) -> Self {
        self.degradation_threshold = threshold;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> TunnelState {
        self.state
    }

    /// Configured degradation threshold.
    #[must_use]
    pub fn degradation_threshold(&self) -> f64 {
        self.degradation_threshold
    }

    /// States reachable from `current` in a single transition.
    #[must_use]
    pub fn allowed_next_states(current: TunnelState) -> Vec<TunnelState> {
        match current {
            TunnelState::Init => vec![TunnelState::Handshaking, TunnelState::Failed],
            TunnelState::Handshaking => vec![TunnelState::Active, TunnelState::Failed],
            TunnelState::Active => {
                vec![TunnelState::Active, TunnelState::Degraded, TunnelState::Failed]
            }
            TunnelState::Degraded => {
                vec![TunnelState::Active, TunnelState::Degraded, TunnelState::Failed]
            }
            TunnelState::Failed => vec![],
        }
    }

    /// Whether `to` is reachable from `from` in a single transition.
    #[must_use]
    pub fn is_valid_transition(from: TunnelState, to: TunnelState) -> bool {
        Self::allowed_next_states(from).contains(&to)
    }

    /// Applies `event` and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] when the event is not legal
    /// in the current state, including any event delivered to the terminal
    /// [`TunnelState::Failed`] state.
    pub fn advance(&mut self, event: TunnelEvent) -> Result<TunnelState> {
        let next = match (self.state, event) {
            (TunnelState::Init, TunnelEvent::HandshakeStarted) => TunnelState::Handshaking,
            (TunnelState::Handshaking, TunnelEvent::HandshakeCompleted { matched: true }) => {
                TunnelState::Active
            }
            (TunnelState::Handshaking, TunnelEvent::HandshakeCompleted { matched: false }) => {
                TunnelState::Failed
            }
            (TunnelState::Active, TunnelEvent::LossObserved(loss)) => {
                if loss > self.degradation_threshold {
                    TunnelState::Degraded
                } else {
                    TunnelState::Active
                }
            }
            (TunnelState::Degraded, TunnelEvent::LossObserved(loss)) => {
                if loss <= self.degradation_threshold {
                    TunnelState::Active
                } else {
                    TunnelState::Degraded
                }
            }
            // Abort is accepted from every non-terminal state.
            (state, TunnelEvent::Abort) if !state.is_terminal() => TunnelState::Failed,
            (state, event) => return Err(CoreError::InvalidTransition { state, event }),
        };

        tracing::debug!(from = %self.state, to = %next, %event, "tunnel transition");
        self.state = next;
        Ok(next)
    }
}
