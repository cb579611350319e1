//! Statistical timing model for handshake phases and network quality.
//!
//! Every phase duration a profile declares is sampled from a Gaussian
//! distribution (Box-Muller over a `ChaCha20Rng`), clamped to be
//! non-negative. Two constructors cover both uses: [`TimingModel::new`]
//! seeds from OS entropy for realistic variation, [`TimingModel::seeded`]
//! makes a run fully reproducible.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use qtunnel_core::{
    config::{AlgorithmProfile, HandshakePhase},
    error::{CoreError, Result},
    record::NetworkSample,
};

/// Gaussian sampler for phase durations and network-quality measurements.
///
/// Owns its RNG; no shared mutable state. Clone a seeded model to replay
/// the same sequence twice.
#[derive(Debug, Clone)]
pub struct TimingModel {
    rng: ChaCha20Rng,
    spare: Option<f64>,
}

impl Default for TimingModel {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingModel {
    /// Creates a model seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self { rng: ChaCha20Rng::from_entropy(), spare: None }
    }

    /// Creates a reproducible model from an explicit seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self { rng: ChaCha20Rng::seed_from_u64(seed), spare: None }
    }

    /// Samples the duration of `phase` in milliseconds.
    ///
    /// The draw follows the profile's declared [`PhaseTiming`] and is
    /// clamped to be non-negative.
    ///
    /// [`PhaseTiming`]: qtunnel_core::config::PhaseTiming
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigurationError`] when the profile does not
    /// declare `phase`.
    pub fn sample(&mut self, phase: HandshakePhase, profile: &AlgorithmProfile) -> Result<f64> {
        let timing = profile.timing(phase).ok_or_else(|| {
            CoreError::ConfigurationError(format!(
                "profile {} does not declare a {phase} phase",
                profile.name
            ))
        })?;
        Ok(self.gauss(timing.mean_ms, timing.std_dev_ms).max(0.0))
    }

    /// Samples one post-establishment network-quality measurement.
    ///
    /// Latency is Gaussian and clamped non-negative; the loss fraction is
    /// the profile's declared mean, clamped to `[0, 1]`.
    pub fn sample_network(&mut self, profile: &AlgorithmProfile) -> NetworkSample {
        let latency_ms = self
            .gauss(profile.network.latency_mean_ms, profile.network.latency_std_dev_ms)
            .max(0.0);
        NetworkSample { latency_ms, packet_loss: profile.network.loss_mean.clamp(0.0, 1.0) }
    }

    // Box-Muller transform. Produces draws in pairs; the second draw is
    // cached for the next call.
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev == 0.0 {
            return mean;
        }
        if let Some(z) = self.spare.take() {
            return mean + std_dev * z;
        }
        // 1 - gen() lies in (0, 1], keeping ln() finite.
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = std::f64::consts::TAU * u2;
        self.spare = Some(radius * theta.sin());
        mean + std_dev * radius * theta.cos()
    }
}
