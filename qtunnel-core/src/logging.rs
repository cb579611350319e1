//! Logging utilities for the tunnel simulation engine.
//!
//! Structured logging via `tracing`, with the guarantee that raw key
//! material never reaches the log stream: secrets are rendered through
//! [`sanitize_secret`], which shows only length and a truncated SHA-256
//! fingerprint.
//!
//! ```rust,no_run
//! use qtunnel_core::logging::{init_tracing, sanitize_secret};
//!
//! // Sets the global tracing subscriber — call once per process.
//! init_tracing().expect("failed to init tracing");
//!
//! let secret = [0x42u8; 32];
//! tracing::info!("shared secret derived: {}", sanitize_secret(&secret));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use std::fmt;

use sha2::{Digest, Sha256};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with environment-based filtering.
///
/// Honors `RUST_LOG`; defaults to `qtunnel=info` when unset. Compact
/// single-line output without targets or thread metadata.
///
/// # Errors
///
/// Returns an error if the tracing subscriber cannot be initialized,
/// typically because one is already set.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qtunnel=info"));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .compact(),
    );

    subscriber.init();

    info!("qtunnel logging initialized");
    Ok(())
}

/// Full SHA-256 fingerprint of `data` as a lowercase hex string.
///
/// Records store these instead of raw secrets, which lets a verdict be
/// revalidated after the fact without ever serializing key material.
#[must_use]
pub fn fingerprint(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Wrap secret bytes for safe logging.
#[must_use]
pub fn sanitize_secret(data: &[u8]) -> SanitizedSecret<'_> {
    SanitizedSecret(data)
}

/// Display wrapper that never reveals the wrapped bytes.
///
/// Renders as `[N bytes, fingerprint: xxxxxxxxxxxxxxxx]` using the first
/// 16 hex characters of the SHA-256 fingerprint.
pub struct SanitizedSecret<'a>(&'a [u8]);

impl fmt::Display for SanitizedSecret<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digest = fingerprint(self.0);
        let short = digest.get(..16).unwrap_or(&digest);
        write!(f, "[{} bytes, fingerprint: {}]", self.0.len(), short)
    }
}
