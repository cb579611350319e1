//! Configuration types for tunnel scenario simulation.
//!
//! An [`AlgorithmProfile`] declares everything a scenario needs: which
//! key-exchange family it exercises, the Gaussian timing parameters of each
//! handshake phase, the post-establishment network-quality parameters, and
//! the byte sizes of the key material involved.
//!
//! Two ready-made profiles cover the checklist scenarios:
//!
//! | Profile                           | Family       | Phases                               |
//! |-----------------------------------|--------------|--------------------------------------|
//! | [`AlgorithmProfile::classical`]   | X25519       | generation, negotiation              |
//! | [`AlgorithmProfile::post_quantum`]| Kyber-768    | generation, encapsulation, decapsulation |

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Key-exchange algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlgorithmFamily {
    /// Classical elliptic-curve Diffie-Hellman (X25519).
    Classical,
    /// Post-quantum lattice KEM (ML-KEM-768 / Kyber-768).
    PostQuantum,
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmFamily::Classical => write!(f, "classical"),
            AlgorithmFamily::PostQuantum => write!(f, "post_quantum"),
        }
    }
}

impl FromStr for AlgorithmFamily {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "classical" => Ok(AlgorithmFamily::Classical),
            "post_quantum" | "post-quantum" => Ok(AlgorithmFamily::PostQuantum),
            other => Err(CoreError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// Phases of a key-exchange handshake.
///
/// Which phases apply depends on the family: classical exchanges run
/// `Generation` then `Negotiation`; KEM exchanges run `Generation`,
/// `Encapsulation`, `Decapsulation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandshakePhase {
    /// Key-pair generation at both endpoints.
    Generation,
    /// Classical shared-secret negotiation (both Diffie-Hellman halves).
    Negotiation,
    /// KEM encapsulation against the peer's public key.
    Encapsulation,
    /// KEM decapsulation of the received ciphertext.
    Decapsulation,
}

impl fmt::Display for HandshakePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakePhase::Generation => write!(f, "generation"),
            HandshakePhase::Negotiation => write!(f, "negotiation"),
            HandshakePhase::Encapsulation => write!(f, "encapsulation"),
            HandshakePhase::Decapsulation => write!(f, "decapsulation"),
        }
    }
}

/// Gaussian timing parameters for one handshake phase, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    /// Mean elapsed time of the phase.
    pub mean_ms: f64,
    /// Standard deviation of the elapsed time.
    pub std_dev_ms: f64,
}

impl PhaseTiming {
    /// Creates timing parameters for a phase.
    #[must_use]
    pub fn new(mean_ms: f64, std_dev_ms: f64) -> Self {
        Self { mean_ms, std_dev_ms }
    }

    fn validate(&self, phase: HandshakePhase) -> Result<()> {
        if !self.mean_ms.is_finite() || self.mean_ms < 0.0 {
            return Err(CoreError::ConfigurationError(format!(
                "{phase} mean must be finite and non-negative, got {}",
                self.mean_ms
            )));
        }
        if !self.std_dev_ms.is_finite() || self.std_dev_ms < 0.0 {
            return Err(CoreError::ConfigurationError(format!(
                "{phase} std dev must be finite and non-negative, got {}",
                self.std_dev_ms
            )));
        }
        Ok(())
    }
}

/// Gaussian parameters for the post-establishment network-quality sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkProfile {
    /// Mean round-trip latency in milliseconds.
    pub latency_mean_ms: f64,
    /// Standard deviation of the latency.
    pub latency_std_dev_ms: f64,
    /// Mean packet-loss fraction, 0.0–1.0.
    pub loss_mean: f64,
}

impl NetworkProfile {
    /// Creates network-quality parameters.
    #[must_use]
    pub fn new(latency_mean_ms: f64, latency_std_dev_ms: f64, loss_mean: f64) -> Self {
        Self { latency_mean_ms, latency_std_dev_ms, loss_mean }
    }

    fn validate(&self) -> Result<()> {
        if !self.latency_mean_ms.is_finite() || self.latency_mean_ms < 0.0 {
            return Err(CoreError::ConfigurationError(format!(
                "network latency mean must be finite and non-negative, got {}",
                self.latency_mean_ms
            )));
        }
        if !self.latency_std_dev_ms.is_finite() || self.latency_std_dev_ms < 0.0 {
            return Err(CoreError::ConfigurationError(format!(
                "network latency std dev must be finite and non-negative, got {}",
                self.latency_std_dev_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.loss_mean) {
            return Err(CoreError::ConfigurationError(format!(
                "loss mean must be within [0, 1], got {}",
                self.loss_mean
            )));
        }
        Ok(())
    }
}

/// Complete scenario configuration for one algorithm family.
///
/// # Examples
/// ```rust
/// use qtunnel_core::config::{AlgorithmProfile, HandshakePhase, PhaseTiming};
///
/// // Stock post-quantum profile with a tightened encapsulation timing.
/// let profile = AlgorithmProfile::post_quantum()
///     .with_phase(HandshakePhase::Encapsulation, PhaseTiming::new(60.0, 2.0));
/// profile.validate().expect("profile is valid");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmProfile {
    /// Key-exchange family this profile exercises.
    pub family: AlgorithmFamily,

    /// Human-readable algorithm name, e.g. `"X25519"` or `"Kyber-768"`.
    pub name: String,

    /// Key-pair generation timing. Always declared.
    pub generation: PhaseTiming,

    /// Classical negotiation timing. Declared only for `Classical`.
    pub negotiation: Option<PhaseTiming>,

    /// KEM encapsulation timing. Declared only for `PostQuantum`.
    pub encapsulation: Option<PhaseTiming>,

    /// KEM decapsulation timing. Declared only for `PostQuantum`.
    pub decapsulation: Option<PhaseTiming>,

    /// Post-establishment network-quality parameters.
    pub network: NetworkProfile,

    /// Public-key size in bytes.
    pub public_key_len: usize,

    /// Secret-key size in bytes.
    pub secret_key_len: usize,

    /// Ciphertext size in bytes. `None` for families without an
    /// encapsulation step.
    pub ciphertext_len: Option<usize>,

    /// Shared-secret size in bytes.
    pub shared_secret_len: usize,
}

impl AlgorithmProfile {
    /// Stock profile for the classical scenario: X25519 key exchange.
    ///
    /// Timing anchors: 100 ms mean generation, 50 ms mean negotiation,
    /// 18.5 ms mean network latency with zero expected loss.
    #[must_use]
    pub fn classical() -> Self {
        Self {
            family: AlgorithmFamily::Classical,
            name: "X25519".to_string(),
            generation: PhaseTiming::new(100.0, 3.0),
            negotiation: Some(PhaseTiming::new(50.0, 2.0)),
            encapsulation: None,
            decapsulation: None,
            network: NetworkProfile::new(18.5, 1.5, 0.0),
            public_key_len: 32,
            secret_key_len: 32,
            ciphertext_len: None,
            shared_secret_len: 32,
        }
    }

    /// Stock profile for the post-quantum scenario: Kyber-768 (ML-KEM-768).
    ///
    /// Timing anchors: 165 ms mean generation (both key pairs), 65 ms mean
    /// encapsulation, 75 ms mean decapsulation. Key sizes follow the
    /// ML-KEM-768 parameter set: 1184 B public key, 2400 B secret key,
    /// 1088 B ciphertext, 32 B shared secret.
    #[must_use]
    pub fn post_quantum() -> Self {
        Self {
            family: AlgorithmFamily::PostQuantum,
            name: "Kyber-768".to_string(),
            generation: PhaseTiming::new(165.0, 5.0),
            negotiation: None,
            encapsulation: Some(PhaseTiming::new(65.0, 4.0)),
            decapsulation: Some(PhaseTiming::new(75.0, 4.0)),
            network: NetworkProfile::new(18.5, 1.5, 0.0),
            public_key_len: 1184,
            secret_key_len: 2400,
            ciphertext_len: Some(1088),
            shared_secret_len: 32,
        }
    }

    /// Stock profile for a named family.
    #[must_use]
    pub fn for_family(family: AlgorithmFamily) -> Self {
        match family {
            AlgorithmFamily::Classical => Self::classical(),
            AlgorithmFamily::PostQuantum => Self::post_quantum(),
        }
    }

    /// Set the display name and return self for method chaining.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override one phase's timing and return self for method chaining.
    #[must_use]
    pub fn with_phase(mut self, phase: HandshakePhase, timing: PhaseTiming) -> Self {
        match phase {
            HandshakePhase::Generation => self.generation = timing,
            HandshakePhase::Negotiation => self.negotiation = Some(timing),
            HandshakePhase::Encapsulation => self.encapsulation = Some(timing),
            HandshakePhase::Decapsulation => self.decapsulation = Some(timing),
        }
        self
    }

    /// Set the network-quality parameters and return self for method chaining.
    #[must_use]
    pub fn with_network(mut self, network: NetworkProfile) -> Self {
        self.network = network;
        self
    }

    /// Timing parameters for `phase`, if this profile declares it.
    #[must_use]
    pub fn timing(&self, phase: HandshakePhase) -> Option<PhaseTiming> {
        match phase {
            HandshakePhase::Generation => Some(self.generation),
            HandshakePhase::Negotiation => self.negotiation,
            HandshakePhase::Encapsulation => self.encapsulation,
            HandshakePhase::Decapsulation => self.decapsulation,
        }
    }

    /// The phases this profile declares, in handshake order.
    #[must_use]
    pub fn declared_phases(&self) -> Vec<HandshakePhase> {
        let mut phases = vec![HandshakePhase::Generation];
        if self.negotiation.is_some() {
            phases.push(HandshakePhase::Negotiation);
        }
        if self.encapsulation.is_some() {
            phases.push(HandshakePhase::Encapsulation);
        }
        if self.decapsulation.is_some() {
            phases.push(HandshakePhase::Decapsulation);
        }
        phases
    }

    /// Validates the profile for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigurationError`] when the name is empty, a
    /// declared timing or the network profile carries a negative or
    /// non-finite parameter, the loss mean falls outside `[0, 1]`, the
    /// declared phases do not match the family, or a key size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigurationError(
                "profile name must not be empty".to_string(),
            ));
        }

        for phase in self.declared_phases() {
            if let Some(timing) = self.timing(phase) {
                timing.validate(phase)?;
            }
        }
        self.network.validate()?;

        match self.family {
            AlgorithmFamily::Classical => {
                if self.negotiation.is_none() {
                    return Err(CoreError::ConfigurationError(
                        "classical profile must declare a negotiation phase".to_string(),
                    ));
                }
                if self.encapsulation.is_some() || self.decapsulation.is_some() {
                    return Err(CoreError::ConfigurationError(
                        "classical profile must not declare KEM phases".to_string(),
                    ));
                }
            }
            AlgorithmFamily::PostQuantum => {
                if self.encapsulation.is_none() || self.decapsulation.is_none() {
                    return Err(CoreError::ConfigurationError(
                        "post-quantum profile must declare encapsulation and decapsulation"
                            .to_string(),
                    ));
                }
                if self.negotiation.is_some() {
                    return Err(CoreError::ConfigurationError(
                        "post-quantum profile must not declare a negotiation phase".to_string(),
                    ));
                }
            }
        }

        if self.public_key_len == 0 || self.secret_key_len == 0 || self.shared_secret_len == 0 {
            return Err(CoreError::ConfigurationError(
                "key sizes must be non-zero".to_string(),
            ));
        }

        Ok(())
    }
}
