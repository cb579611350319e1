//! # QTunnel
//!
//! Tunnel establishment simulation and validation engine.
//!
//! Validates key-exchange checklist scenarios end to end: a classical
//! X25519 path (checkpoint CP-01) and a post-quantum Kyber-768 path
//! (checkpoint CP-02). Each run simulates the handshake with statistical
//! timing variation, verifies key-material integrity between the two
//! simulated endpoints, drives a strict tunnel lifecycle state machine,
//! and judges the measurements against declared acceptance criteria.
//!
//! ## Quick Start
//!
//! ```rust
//! use qtunnel::{ChecklistCriteria, run_scenario};
//!
//! let (record, verdict) =
//!     run_scenario("post_quantum", &ChecklistCriteria::post_quantum_checkpoint())?;
//!
//! assert_eq!(record.algorithm(), "Kyber-768");
//! for result in verdict.results() {
//!     println!("{}: {} (expected {})", result.name, result.observed, result.expected);
//! }
//! # Ok::<(), qtunnel::CoreError>(())
//! ```
//!
//! Reproducible runs and the deterministic backend go through
//! [`ScenarioOptions`]:
//!
//! ```rust
//! use qtunnel::{
//!     AlgorithmProfile, BackendKind, ChecklistCriteria, ScenarioOptions, run_scenario_with,
//! };
//!
//! let options = ScenarioOptions::new(AlgorithmProfile::classical())
//!     .with_backend(BackendKind::Simulated)
//!     .with_seed(42);
//! let (record, _) = run_scenario_with(&options, &ChecklistCriteria::classical_checkpoint())?;
//! assert!(record.handshake().matched());
//! # Ok::<(), qtunnel::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

pub mod analysis;
pub mod scenario;

pub use analysis::{ScenarioComparison, compare_records};
pub use scenario::{ScenarioOptions, run_scenario, run_scenario_with};

pub use qtunnel_core::{
    Band, ChecklistCriteria, ChecklistEvaluator, ChecklistVerdict, CoreError, CriterionResult,
    Result,
};
pub use qtunnel_core::{
    AlgorithmFamily, AlgorithmProfile, HandshakePhase, NetworkProfile, PhaseTiming,
};
pub use qtunnel_core::{
    HandshakeResult, MetricsRecord, MetricsRecorder, NetworkSample, PhaseSample,
};
pub use qtunnel_core::{TunnelEvent, TunnelState, TunnelStateMachine};
pub use qtunnel_core::logging::init_tracing;

pub use qtunnel_sim::{
    BackendKind, IntegrityVerifier, KeyExchangeBackend, KeyExchangeSimulator, RealBackend,
    SimulatedBackend, TimingModel,
};
