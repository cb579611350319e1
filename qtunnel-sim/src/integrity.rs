//! Key-material integrity verification.
//!
//! Independent, side-effect-free check that both endpoints of a handshake
//! derived the same secret. Comparison is constant-time over the secret
//! bytes; a length mismatch is a non-match, never an error.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use subtle::ConstantTimeEq;

use qtunnel_core::record::HandshakeResult;

pub use qtunnel_core::logging::fingerprint;

/// Constant-time equality over two secrets.
///
/// Lengths are compared first; equal-length inputs are compared without
/// data-dependent branching.
#[must_use]
pub fn secrets_match(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Verifies key-material integrity of finished handshakes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegrityVerifier;

impl IntegrityVerifier {
    /// Creates a verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Re-checks that both endpoints of `handshake` hold identical
    /// secrets, independent of the `matched` flag the simulator set.
    #[must_use]
    pub fn verify(&self, handshake: &HandshakeResult) -> bool {
        secrets_match(handshake.secret_initiator(), handshake.secret_responder())
    }

    /// Checks a secret against a stored SHA-256 fingerprint, enabling
    /// revalidation of an already-serialized record.
    #[must_use]
    pub fn verify_fingerprint(&self, secret: &[u8], expected_hex: &str) -> bool {
        let computed = fingerprint(secret);
        computed.as_bytes().ct_eq(expected_hex.as_bytes()).into()
    }
}
