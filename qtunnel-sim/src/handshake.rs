//! Key-exchange handshake simulation.
//!
//! The [`KeyExchangeSimulator`] drives one handshake: it samples a
//! duration for every phase the profile declares, runs the configured
//! backend's exchange, and settles the `matched` flag with a
//! constant-time comparison of the two secrets. No I/O, no real
//! network traffic.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use qtunnel_core::{
    config::AlgorithmProfile,
    error::{CoreError, Result},
    record::{HandshakeResult, PhaseSample},
};

use crate::{backend::KeyExchangeBackend, integrity::secrets_match, timing::TimingModel};

/// Runs simulated handshakes for one backend.
pub struct KeyExchangeSimulator {
    backend: Box<dyn KeyExchangeBackend>,
    timing: TimingModel,
}

impl KeyExchangeSimulator {
    /// Creates a simulator from a backend and a timing model.
    #[must_use]
    pub fn new(backend: Box<dyn KeyExchangeBackend>, timing: TimingModel) -> Self {
        Self { backend, timing }
    }

    /// The simulator's timing model, for sampling measurements that share
    /// its random stream (e.g. the post-establishment network sample).
    pub fn timing_mut(&mut self) -> &mut TimingModel {
        &mut self.timing
    }

    /// Simulates one full handshake under `profile`.
    ///
    /// Phase durations are sampled in the profile's declared order; the
    /// key material and the reported byte sizes come from the backend's
    /// actual exchange.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigurationError`] when the profile fails
    /// validation, [`CoreError::UnsupportedAlgorithm`] when the profile's
    /// family does not match the backend, and
    /// [`CoreError::KeyExchangeFailed`] when the exchange itself fails.
    pub fn run(&mut self, profile: &AlgorithmProfile) -> Result<HandshakeResult> {
        profile.validate()?;

        if profile.family != self.backend.family() {
            return Err(CoreError::UnsupportedAlgorithm(format!(
                "backend implements {}, profile {} requires {}",
                self.backend.family(),
                profile.name,
                profile.family
            )));
        }

        let mut phases = Vec::new();
        for phase in profile.declared_phases() {
            let elapsed_ms = self.timing.sample(phase, profile)?;
            tracing::debug!(%phase, elapsed_ms, "phase simulated");
            phases.push(PhaseSample::new(phase, elapsed_ms));
        }

        let outcome = self.backend.exchange()?;
        let matched = secrets_match(&outcome.secret_initiator, &outcome.secret_responder);

        tracing::info!(
            algorithm = %profile.name,
            matched,
            public_key_len = outcome.public_key_len,
            "handshake simulated"
        );

        Ok(HandshakeResult::new(
            phases,
            outcome.secret_initiator,
            outcome.secret_responder,
            matched,
            outcome.public_key_len,
            outcome.ciphertext_len,
        ))
    }
}
