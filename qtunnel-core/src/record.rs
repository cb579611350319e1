//! Measurement records emitted by scenario runs.
//!
//! [`HandshakeResult`] captures what the simulator measured; the
//! [`MetricsRecorder`] combines it with the final tunnel state and the
//! optional network-quality sample into a write-once [`MetricsRecord`].
//!
//! Secrets never leave the process through a record: the raw bytes are
//! held in [`Zeroizing`] buffers that serialization skips, and the record
//! carries only their SHA-256 fingerprints.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::{
    config::{AlgorithmFamily, AlgorithmProfile, HandshakePhase},
    error::{CoreError, Result},
    logging::fingerprint,
    state::TunnelState,
};

/// Elapsed time measured for one handshake phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSample {
    /// The phase that was measured.
    pub phase: HandshakePhase,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: f64,
}

impl PhaseSample {
    /// Creates a phase measurement.
    #[must_use]
    pub fn new(phase: HandshakePhase, elapsed_ms: f64) -> Self {
        Self { phase, elapsed_ms }
    }
}

/// Outcome of one simulated key exchange.
///
/// Immutable once produced: all fields are private and exposed through
/// accessors. The two endpoints' secrets are zeroized on drop and skipped
/// by serialization.
#[derive(Clone, Serialize)]
pub struct HandshakeResult {
    phases: Vec<PhaseSample>,
    #[serde(skip)]
    secret_initiator: Zeroizing<Vec<u8>>,
    #[serde(skip)]
    secret_responder: Zeroizing<Vec<u8>>,
    matched: bool,
    public_key_len: usize,
    ciphertext_len: Option<usize>,
}

impl HandshakeResult {
    /// Assembles a handshake outcome from its measured parts.
    #[must_use]
    pub fn new(
        phases: Vec<PhaseSample>,
        secret_initiator: Vec<u8>,
        secret_responder: Vec<u8>,
        matched: bool,
        public_key_len: usize,
        ciphertext_len: Option<usize>,
    ) -> Self {
        Self {
            phases,
            secret_initiator: Zeroizing::new(secret_initiator),
            secret_responder: Zeroizing::new(secret_responder),
            matched,
            public_key_len,
            ciphertext_len,
        }
    }

    /// Per-phase measurements, in handshake order.
    #[must_use]
    pub fn phases(&self) -> &[PhaseSample] {
        &self.phases
    }

    /// Elapsed milliseconds of `phase`, if it was measured.
    #[must_use]
    pub fn phase_elapsed_ms(&self, phase: HandshakePhase) -> Option<f64> {
        self.phases.iter().find(|s| s.phase == phase).map(|s| s.elapsed_ms)
    }

    /// Whether both endpoints derived identical secrets.
    #[must_use]
    pub fn matched(&self) -> bool {
        self.matched
    }

    /// The initiator's derived secret.
    #[must_use]
    pub fn secret_initiator(&self) -> &[u8] {
        &self.secret_initiator
    }

    /// The responder's derived secret.
    #[must_use]
    pub fn secret_responder(&self) -> &[u8] {
        &self.secret_responder
    }

    /// Public-key size exchanged during the handshake, in bytes.
    #[must_use]
    pub fn public_key_len(&self) -> usize {
        self.public_key_len
    }

    /// Ciphertext size, for families with an encapsulation step.
    #[must_use]
    pub fn ciphertext_len(&self) -> Option<usize> {
        self.ciphertext_len
    }

    /// Total handshake time: the sum of all measured phases, in
    /// milliseconds.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.phases.iter().map(|s| s.elapsed_ms).sum()
    }
}

impl fmt::Debug for HandshakeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandshakeResult")
            .field("phases", &self.phases)
            .field("secret_initiator", &format_args!("[{} bytes]", self.secret_initiator.len()))
            .field("secret_responder", &format_args!("[{} bytes]", self.secret_responder.len()))
            .field("matched", &self.matched)
            .field("public_key_len", &self.public_key_len)
            .field("ciphertext_len", &self.ciphertext_len)
            .finish()
    }
}

/// One post-establishment network-quality measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkSample {
    /// Round-trip latency in milliseconds.
    pub latency_ms: f64,
    /// Packet-loss fraction, 0.0–1.0.
    pub packet_loss: f64,
}

/// Complete, write-once record of one scenario run.
///
/// Produced only by [`MetricsRecorder::record`]; all fields are private
/// and read through accessors. Serializes without any key material.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsRecord {
    family: AlgorithmFamily,
    algorithm: String,
    handshake: HandshakeResult,
    final_state: TunnelState,
    network: Option<NetworkSample>,
    recorded_at: DateTime<Utc>,
    fingerprint_initiator: String,
    fingerprint_responder: String,
}

impl MetricsRecord {
    /// Key-exchange family the run exercised.
    #[must_use]
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Algorithm display name, e.g. `"Kyber-768"`.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// The measured handshake.
    #[must_use]
    pub fn handshake(&self) -> &HandshakeResult {
        &self.handshake
    }

    /// Final tunnel state of the run.
    #[must_use]
    pub fn final_state(&self) -> TunnelState {
        self.final_state
    }

    /// Network-quality sample. Present exactly when the tunnel was
    /// established.
    #[must_use]
    pub fn network(&self) -> Option<NetworkSample> {
        self.network
    }

    /// When the record was produced.
    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// SHA-256 fingerprint of the initiator's secret, lowercase hex.
    #[must_use]
    pub fn fingerprint_initiator(&self) -> &str {
        &self.fingerprint_initiator
    }

    /// SHA-256 fingerprint of the responder's secret, lowercase hex.
    #[must_use]
    pub fn fingerprint_responder(&self) -> &str {
        &self.fingerprint_responder
    }
}

/// Assembles [`MetricsRecord`]s and enforces their completeness rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsRecorder;

impl MetricsRecorder {
    /// Creates a recorder.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Builds the record for one finished run.
    ///
    /// A network sample must accompany an established tunnel and nothing
    /// else: quality is only measurable once traffic can flow.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IncompleteData`] when `network` is `None` for
    /// an `Active`/`Degraded` tunnel, or `Some` for any other state.
    pub fn record(
        &self,
        profile: &AlgorithmProfile,
        handshake: HandshakeResult,
        final_state: TunnelState,
        network: Option<NetworkSample>,
    ) -> Result<MetricsRecord> {
        if final_state.is_established() && network.is_none() {
            return Err(CoreError::IncompleteData(format!(
                "network sample missing for {final_state} tunnel"
            )));
        }
        if !final_state.is_established() && network.is_some() {
            return Err(CoreError::IncompleteData(format!(
                "network sample present for {final_state} tunnel"
            )));
        }

        let record = MetricsRecord {
            family: profile.family,
            algorithm: profile.name.clone(),
            fingerprint_initiator: fingerprint(handshake.secret_initiator()),
            fingerprint_responder: fingerprint(handshake.secret_responder()),
            handshake,
            final_state,
            network,
            recorded_at: Utc::now(),
        };

        tracing::info!(
            family = %record.family,
            algorithm = %record.algorithm,
            state = %record.final_state,
            total_handshake_ms = record.handshake.total_ms(),
            "scenario recorded"
        );

        Ok(record)
    }
}
