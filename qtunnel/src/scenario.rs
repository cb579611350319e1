//! Scenario execution: the full pipeline from profile to verdict.
//!
//! One run wires the components together in a fixed order: handshake
//! simulation, independent integrity verification, tunnel state machine,
//! network-quality sampling (only once the tunnel is established),
//! metrics recording, and checklist evaluation.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use qtunnel_core::{
    checklist::{ChecklistCriteria, ChecklistEvaluator, ChecklistVerdict},
    config::{AlgorithmFamily, AlgorithmProfile},
    error::{CoreError, Result},
    record::{MetricsRecord, MetricsRecorder},
    state::{DEFAULT_DEGRADATION_THRESHOLD, TunnelEvent, TunnelStateMachine},
};
use qtunnel_sim::{
    backend::BackendKind, handshake::KeyExchangeSimulator, integrity::IntegrityVerifier,
    timing::TimingModel,
};

/// Everything a scenario run can be configured with.
///
/// # Examples
/// ```rust
/// use qtunnel::scenario::ScenarioOptions;
/// use qtunnel_core::config::AlgorithmProfile;
/// use qtunnel_sim::backend::BackendKind;
///
/// let options = ScenarioOptions::new(AlgorithmProfile::post_quantum())
///     .with_backend(BackendKind::Simulated)
///     .with_seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioOptions {
    /// Algorithm profile the run exercises.
    pub profile: AlgorithmProfile,
    /// Which backend implementation performs the exchange.
    pub backend: BackendKind,
    /// Seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Packet-loss fraction above which an established tunnel degrades.
    pub degradation_threshold: f64,
}

impl ScenarioOptions {
    /// Creates options for `profile` with the real backend, entropy
    /// seeding, and the default degradation threshold.
    #[must_use]
    pub fn new(profile: AlgorithmProfile) -> Self {
        Self {
            profile,
            backend: BackendKind::Real,
            seed: None,
            degradation_threshold: DEFAULT_DEGRADATION_THRESHOLD,
        }
    }

    /// Set the backend kind and return self for method chaining.
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Set a reproducibility seed and return self for method chaining.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the degradation threshold and return self for method chaining.
    #[must_use]
    pub fn with_degradation_threshold(mut self, threshold: f64) -> Self {
        self.degradation_threshold = threshold;
        self
    }
}

/// Runs a named checklist scenario and judges it against `criteria`.
///
/// `scenario` is `"classical"` or `"post_quantum"`; the run uses the
/// stock profile of that family with the real backend.
///
/// # Errors
///
/// Returns [`CoreError::ConfigurationError`] for an unknown scenario name
/// or invalid criteria, plus any error the pipeline itself produces.
pub fn run_scenario(
    scenario: &str,
    criteria: &ChecklistCriteria,
) -> Result<(MetricsRecord, ChecklistVerdict)> {
    let family: AlgorithmFamily = scenario
        .parse()
        .map_err(|_| CoreError::ConfigurationError(format!("unknown scenario '{scenario}'")))?;
    run_scenario_with(&ScenarioOptions::new(AlgorithmProfile::for_family(family)), criteria)
}

/// Runs one fully configured scenario and judges it against `criteria`.
///
/// Pipeline: simulate the handshake, verify key-material integrity
/// independently of the simulator's own flag, drive the tunnel state
/// machine, sample network quality once the tunnel is established,
/// assemble the record, evaluate the checklist.
///
/// # Errors
///
/// Propagates every pipeline error unchanged: configuration and criteria
/// validation failures, family/backend mismatches, key-exchange failures,
/// invalid state transitions, and incomplete-record violations.
pub fn run_scenario_with(
    options: &ScenarioOptions,
    criteria: &ChecklistCriteria,
) -> Result<(MetricsRecord, ChecklistVerdict)> {
    criteria.validate()?;
    options.profile.validate()?;

    tracing::info!(
        scenario = %options.profile.family,
        algorithm = %options.profile.name,
        checkpoint = %criteria.name,
        backend = ?options.backend,
        "scenario started"
    );

    let backend = options.backend.instantiate(&options.profile, options.seed);
    let timing = options.seed.map_or_else(TimingModel::new, TimingModel::seeded);
    let mut simulator = KeyExchangeSimulator::new(backend, timing);

    let mut machine =
        TunnelStateMachine::new().with_degradation_threshold(options.degradation_threshold);
    machine.advance(TunnelEvent::HandshakeStarted)?;

    let handshake = simulator.run(&options.profile)?;

    // The state machine is driven by an independent integrity check, not
    // by the flag the simulator already settled.
    let matched = IntegrityVerifier::new().verify(&handshake);
    machine.advance(TunnelEvent::HandshakeCompleted { matched })?;

    let network = if machine.state().is_established() {
        let sample = simulator.timing_mut().sample_network(&options.profile);
        machine.advance(TunnelEvent::LossObserved(sample.packet_loss))?;
        Some(sample)
    } else {
        None
    };

    let record =
        MetricsRecorder::new().record(&options.profile, handshake, machine.state(), network)?;
    let verdict = ChecklistEvaluator::new().evaluate(&record, criteria)?;

    tracing::info!(
        checkpoint = %verdict.checkpoint(),
        passed = verdict.passed(),
        state = %record.final_state(),
        "scenario finished"
    );

    Ok((record, verdict))
}
