//! Key-exchange backends.
//!
//! A [`KeyExchangeBackend`] produces the two endpoints' shared secrets for
//! one handshake. Two implementations exist behind the trait:
//!
//! - [`RealBackend`] calls the actual primitives: X25519 Diffie-Hellman
//!   for the classical family, FIPS 203 ML-KEM-768 for the post-quantum
//!   family.
//! - [`SimulatedBackend`] is a deterministic stand-in that reports the
//!   profile's declared byte shapes, useful for reproducible runs and for
//!   exercising the mismatch path through fault injection.
//!
//! The backend is selected once via [`BackendKind`]; everything downstream
//! of the simulator is backend-agnostic.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use fips203::ml_kem_768;
use fips203::traits::{Decaps, Encaps, KeyGen, SerDes};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

use qtunnel_core::{
    config::{AlgorithmFamily, AlgorithmProfile},
    error::{CoreError, Result},
};

/// X25519 key and secret size in bytes.
const X25519_LEN: usize = 32;

/// The raw product of one key exchange: both endpoints' secrets plus the
/// byte sizes of the material that crossed the wire.
#[derive(Debug)]
pub struct ExchangeOutcome {
    /// Secret derived by the initiating endpoint.
    pub secret_initiator: Vec<u8>,
    /// Secret derived by the responding endpoint.
    pub secret_responder: Vec<u8>,
    /// Public-key size in bytes.
    pub public_key_len: usize,
    /// Ciphertext size in bytes, for families with an encapsulation step.
    pub ciphertext_len: Option<usize>,
}

/// A key-exchange mechanism for one algorithm family.
pub trait KeyExchangeBackend {
    /// The family this backend implements.
    fn family(&self) -> AlgorithmFamily;

    /// Runs one full exchange and returns both endpoints' secrets.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::KeyExchangeFailed`] when the underlying
    /// primitive fails.
    fn exchange(&mut self) -> Result<ExchangeOutcome>;
}

/// Which backend implementation a scenario uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Call the real cryptographic primitives.
    #[default]
    Real,
    /// Use the deterministic stand-in.
    Simulated,
}

impl BackendKind {
    /// Builds a backend of this kind for `profile`.
    ///
    /// The `Simulated` backend reports the profile's declared byte shapes,
    /// so a customized profile stays self-consistent end to end. A seed
    /// makes it fully reproducible; the `Real` backend uses the seed only
    /// for classical key generation (ML-KEM keygen draws from OS entropy
    /// inside the primitive) and reports the primitives' actual sizes.
    #[must_use]
    pub fn instantiate(
        self,
        profile: &AlgorithmProfile,
        seed: Option<u64>,
    ) -> Box<dyn KeyExchangeBackend> {
        match (self, seed) {
            (BackendKind::Real, Some(seed)) => {
                Box::new(RealBackend::seeded(profile.family, seed))
            }
            (BackendKind::Real, None) => Box::new(RealBackend::new(profile.family)),
            (BackendKind::Simulated, Some(seed)) => {
                Box::new(SimulatedBackend::seeded(profile.family, seed).with_shapes(
                    profile.public_key_len,
                    profile.ciphertext_len,
                ))
            }
            (BackendKind::Simulated, None) => Box::new(
                SimulatedBackend::new(profile.family)
                    .with_shapes(profile.public_key_len, profile.ciphertext_len),
            ),
        }
    }
}

/// Backend that runs the actual key-exchange primitives.
#[derive(Debug)]
pub struct RealBackend {
    family: AlgorithmFamily,
    rng: ChaCha20Rng,
}

impl RealBackend {
    /// Creates a backend for `family` seeded from OS entropy.
    #[must_use]
    pub fn new(family: AlgorithmFamily) -> Self {
        Self { family, rng: ChaCha20Rng::from_entropy() }
    }

    /// Creates a backend with reproducible classical key generation.
    #[must_use]
    pub fn seeded(family: AlgorithmFamily, seed: u64) -> Self {
        Self { family, rng: ChaCha20Rng::seed_from_u64(seed) }
    }

    // Full X25519 exchange: both endpoints generate a key pair, then each
    // runs Diffie-Hellman against the other's public key.
    fn exchange_classical(&mut self) -> ExchangeOutcome {
        let mut bytes = [0u8; X25519_LEN];

        self.rng.fill_bytes(&mut bytes);
        let initiator = StaticSecret::from(bytes);
        self.rng.fill_bytes(&mut bytes);
        let responder = StaticSecret::from(bytes);
        bytes.zeroize();

        let initiator_pub = PublicKey::from(&initiator);
        let responder_pub = PublicKey::from(&responder);

        let secret_initiator = initiator.diffie_hellman(&responder_pub).as_bytes().to_vec();
        let secret_responder = responder.diffie_hellman(&initiator_pub).as_bytes().to_vec();

        ExchangeOutcome {
            secret_initiator,
            secret_responder,
            public_key_len: X25519_LEN,
            ciphertext_len: None,
        }
    }

    // ML-KEM-768 exchange: the responder generates the key pair, the
    // initiator encapsulates against its public key, the responder
    // decapsulates the ciphertext.
    fn exchange_post_quantum(&self) -> Result<ExchangeOutcome> {
        let (ek, dk) = <ml_kem_768::KG as KeyGen>::try_keygen()
            .map_err(|e| CoreError::KeyExchangeFailed(format!("ML-KEM keygen failed: {e}")))?;

        let (ss_initiator, ct) = ek
            .try_encaps()
            .map_err(|e| CoreError::KeyExchangeFailed(format!("ML-KEM encaps failed: {e}")))?;

        let ss_responder = dk
            .try_decaps(&ct)
            .map_err(|e| CoreError::KeyExchangeFailed(format!("ML-KEM decaps failed: {e}")))?;

        let public_key_len = ek.into_bytes().len();
        let ciphertext_len = ct.into_bytes().len();

        Ok(ExchangeOutcome {
            secret_initiator: ss_initiator.into_bytes().to_vec(),
            secret_responder: ss_responder.into_bytes().to_vec(),
            public_key_len,
            ciphertext_len: Some(ciphertext_len),
        })
    }
}

impl KeyExchangeBackend for RealBackend {
    fn family(&self) -> AlgorithmFamily {
        self.family
    }

    fn exchange(&mut self) -> Result<ExchangeOutcome> {
        match self.family {
            AlgorithmFamily::Classical => Ok(self.exchange_classical()),
            AlgorithmFamily::PostQuantum => self.exchange_post_quantum(),
        }
    }
}

/// Deterministic stand-in backend.
///
/// Draws a single 32-byte shared secret from its RNG and reports the byte
/// shapes of the profile it stands in for, without running any primitive.
/// With fault injection enabled, one byte of the responder's secret is
/// flipped so the mismatch path can be exercised on demand.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    family: AlgorithmFamily,
    rng: ChaCha20Rng,
    inject_fault: bool,
    public_key_len: usize,
    ciphertext_len: Option<usize>,
}

impl SimulatedBackend {
    /// Creates a stand-in for `family` seeded from OS entropy.
    #[must_use]
    pub fn new(family: AlgorithmFamily) -> Self {
        Self::with_rng(family, ChaCha20Rng::from_entropy())
    }

    /// Creates a fully reproducible stand-in.
    #[must_use]
    pub fn seeded(family: AlgorithmFamily, seed: u64) -> Self {
        Self::with_rng(family, ChaCha20Rng::seed_from_u64(seed))
    }

    fn with_rng(family: AlgorithmFamily, rng: ChaCha20Rng) -> Self {
        let (public_key_len, ciphertext_len) = match family {
            AlgorithmFamily::Classical => (X25519_LEN, None),
            AlgorithmFamily::PostQuantum => (1184, Some(1088)),
        };
        Self { family, rng, inject_fault: false, public_key_len, ciphertext_len }
    }

    /// Overrides the byte shapes reported in exchange outcomes, so the
    /// stand-in matches whatever profile it is simulating.
    #[must_use]
    pub fn with_shapes(mut self, public_key_len: usize, ciphertext_len: Option<usize>) -> Self {
        self.public_key_len = public_key_len;
        self.ciphertext_len = ciphertext_len;
        self
    }

    /// Flip one byte of the responder's secret on every exchange.
    #[must_use]
    pub fn with_fault_injection(mut self) -> Self {
        self.inject_fault = true;
        self
    }
}

impl KeyExchangeBackend for SimulatedBackend {
    fn family(&self) -> AlgorithmFamily {
        self.family
    }

    fn exchange(&mut self) -> Result<ExchangeOutcome> {
        let mut secret = vec![0u8; 32];
        self.rng.fill_bytes(&mut secret);

        let mut responder = secret.clone();
        if self.inject_fault {
            responder[0] ^= 0x01;
        }

        Ok(ExchangeOutcome {
            secret_initiator: secret,
            secret_responder: responder,
            public_key_len: self.public_key_len,
            ciphertext_len: self.ciphertext_len,
        })
    }
}
