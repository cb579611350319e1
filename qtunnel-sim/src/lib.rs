//! # QTunnel Sim
//!
//! Simulation layer of the tunnel establishment validation engine:
//! statistical timing model, key-exchange backends (real primitives and a
//! deterministic stand-in), the handshake simulator, and independent
//! key-material integrity verification.
//!
//! ## Quick Start
//!
//! ```rust
//! use qtunnel_core::config::AlgorithmProfile;
//! use qtunnel_sim::{
//!     backend::BackendKind, handshake::KeyExchangeSimulator, integrity::IntegrityVerifier,
//!     timing::TimingModel,
//! };
//!
//! let profile = AlgorithmProfile::classical();
//! let backend = BackendKind::Real.instantiate(&profile, Some(42));
//! let mut simulator = KeyExchangeSimulator::new(backend, TimingModel::seeded(42));
//!
//! let result = simulator.run(&profile)?;
//! assert!(result.matched());
//! assert!(IntegrityVerifier::new().verify(&result));
//! # Ok::<(), qtunnel_core::error::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

pub mod backend;
pub mod handshake;
pub mod integrity;
pub mod timing;

pub use backend::{
    BackendKind, ExchangeOutcome, KeyExchangeBackend, RealBackend, SimulatedBackend,
};
pub use handshake::KeyExchangeSimulator;
pub use integrity::{IntegrityVerifier, fingerprint, secrets_match};
pub use timing::TimingModel;
