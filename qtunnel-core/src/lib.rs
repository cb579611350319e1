//! # QTunnel Core
//!
//! Core library for the tunnel establishment simulation and validation
//! engine. Provides the data model, configuration, tunnel lifecycle state
//! machine, metrics recording, and checklist evaluation shared by every
//! scenario run.
//!
//! ## Key Features
//!
//! - **Algorithm profiles**: declarative timing and key-size parameters
//!   for the classical (X25519) and post-quantum (Kyber-768) scenarios
//! - **Tunnel state machine**: strict lifecycle with a terminal failure
//!   state and explicit invalid-transition errors
//! - **Write-once records**: measurement records that serialize without
//!   key material, carrying SHA-256 fingerprints instead
//! - **Strict checklist evaluation**: every declared criterion judged
//!   independently; unavailable observables fail, they are never skipped
//!
//! ## Quick Start
//!
//! ```rust
//! use qtunnel_core::{
//!     checklist::{ChecklistCriteria, ChecklistEvaluator},
//!     config::{AlgorithmProfile, HandshakePhase},
//!     record::{HandshakeResult, MetricsRecorder, NetworkSample, PhaseSample},
//!     state::TunnelState,
//! };
//!
//! let profile = AlgorithmProfile::classical();
//! let handshake = HandshakeResult::new(
//!     vec![
//!         PhaseSample::new(HandshakePhase::Generation, 103.0),
//!         PhaseSample::new(HandshakePhase::Negotiation, 50.4),
//!     ],
//!     vec![0x11; 32],
//!     vec![0x11; 32],
//!     true,
//!     32,
//!     None,
//! );
//!
//! let record = MetricsRecorder::new().record(
//!     &profile,
//!     handshake,
//!     TunnelState::Active,
//!     Some(NetworkSample { latency_ms: 18.5, packet_loss: 0.0 }),
//! )?;
//!
//! let verdict = ChecklistEvaluator::new()
//!     .evaluate(&record, &ChecklistCriteria::classical_checkpoint())?;
//! assert!(verdict.passed());
//! # Ok::<(), qtunnel_core::error::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

pub mod checklist;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod state;

pub use checklist::{Band, ChecklistCriteria, ChecklistEvaluator, ChecklistVerdict, CriterionResult};
pub use config::{
    AlgorithmFamily, AlgorithmProfile, HandshakePhase, NetworkProfile, PhaseTiming,
};
pub use error::{CoreError, Result};
pub use record::{HandshakeResult, MetricsRecord, MetricsRecorder, NetworkSample, PhaseSample};
pub use state::{
    DEFAULT_DEGRADATION_THRESHOLD, TunnelEvent, TunnelState, TunnelStateMachine,
};
