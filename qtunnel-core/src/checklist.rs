//! Checklist evaluation of recorded scenario runs.
//!
//! A [`ChecklistCriteria`] declares the acceptance thresholds of one
//! checkpoint; the [`ChecklistEvaluator`] judges a [`MetricsRecord`]
//! against them and emits an ordered [`ChecklistVerdict`].
//!
//! Evaluation is strict: every declared criterion is judged against the
//! record exactly as measured. A criterion whose observable is
//! unavailable (latency on a tunnel that never established, a phase the
//! handshake never ran) is reported as failed, never skipped.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use serde::{Deserialize, Serialize};

use crate::{
    config::HandshakePhase,
    error::{CoreError, Result},
    record::MetricsRecord,
    state::TunnelState,
};

/// An inclusive acceptance band. Both ends are part of the band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lower bound, inclusive.
    pub min: f64,
    /// Upper bound, inclusive.
    pub max: f64,
}

impl Band {
    /// Creates a band.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the band, bounds included.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn validate(&self, what: &str) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() || self.min > self.max {
            return Err(CoreError::ConfigurationError(format!(
                "{what} band [{}, {}] is not a valid interval",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Acceptance thresholds for one checklist checkpoint.
///
/// Every threshold is optional; a criterion is evaluated only when
/// declared. At least one must be declared for the criteria to be valid.
///
/// # Examples
/// ```rust
/// use qtunnel_core::checklist::{Band, ChecklistCriteria};
///
/// let criteria = ChecklistCriteria::new("CP-01")
///     .with_key_match_required()
///     .with_latency_band(Band::new(15.0, 25.0))
///     .with_max_loss(0.01);
/// criteria.validate().expect("criteria are valid");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistCriteria {
    /// Checkpoint identifier, e.g. `"CP-01"`.
    pub name: String,

    /// Ceiling on the generation phase, in milliseconds.
    pub max_generation_ms: Option<f64>,

    /// Acceptance band for the encapsulation phase, in milliseconds.
    pub encapsulation_band: Option<Band>,

    /// Acceptance band for the decapsulation phase, in milliseconds.
    pub decapsulation_band: Option<Band>,

    /// Required final tunnel state.
    pub required_state: Option<TunnelState>,

    /// Acceptance band for the measured latency, in milliseconds.
    pub latency_band: Option<Band>,

    /// Ceiling on the measured packet-loss fraction, inclusive.
    pub max_loss: Option<f64>,

    /// Whether both endpoints must have derived identical secrets.
    pub require_key_match: bool,
}

impl ChecklistCriteria {
    /// Creates empty criteria for a named checkpoint.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_generation_ms: None,
            encapsulation_band: None,
            decapsulation_band: None,
            required_state: None,
            latency_band: None,
            max_loss: None,
            require_key_match: false,
        }
    }

    /// Stock criteria for the classical checkpoint CP-01.
    ///
    /// Key integrity, `ACTIVE` final state, generation under 150 ms,
    /// latency within 15–25 ms, loss at most 1 %.
    #[must_use]
    pub fn classical_checkpoint() -> Self {
        Self::new("CP-01")
            .with_key_match_required()
            .with_required_state(TunnelState::Active)
            .with_max_generation_ms(150.0)
            .with_latency_band(Band::new(15.0, 25.0))
            .with_max_loss(0.01)
    }

    /// Stock criteria for the post-quantum checkpoint CP-02.
    ///
    /// Key integrity, `ACTIVE` final state, generation under 250 ms,
    /// encapsulation within 50–80 ms, decapsulation within 60–90 ms,
    /// latency within 15–25 ms, loss at most 1 %.
    #[must_use]
    pub fn post_quantum_checkpoint() -> Self {
        Self::new("CP-02")
            .with_key_match_required()
            .with_required_state(TunnelState::Active)
            .with_max_generation_ms(250.0)
            .with_encapsulation_band(Band::new(50.0, 80.0))
            .with_decapsulation_band(Band::new(60.0, 90.0))
            .with_latency_band(Band::new(15.0, 25.0))
            .with_max_loss(0.01)
    }

    /// Require identical secrets at both endpoints.
    #[must_use]
    pub fn with_key_match_required(mut self) -> Self {
        self.require_key_match = true;
        self
    }

    /// Require a specific final tunnel state.
    #[must_use]
    pub fn with_required_state(mut self, state: TunnelState) -> Self {
        self.required_state = Some(state);
        self
    }

    /// Set the generation-phase ceiling in milliseconds.
    #[must_use]
    pub fn with_max_generation_ms(mut self, ceiling: f64) -> Self {
        self.max_generation_ms = Some(ceiling);
        self
    }

    /// Set the encapsulation-phase acceptance band.
    #[must_use]
    pub fn with_encapsulation_band(mut self, band: Band) -> Self {
        self.encapsulation_band = Some(band);
        self
    }

    /// Set the decapsulation-phase acceptance band.
    #[must_use]
    pub fn with_decapsulation_band(mut self, band: Band) -> Self {
        self.decapsulation_band = Some(band);
        self
    }

    /// Set the latency acceptance band.
    #[must_use]
    pub fn with_latency_band(mut self, band: Band) -> Self {
        self.latency_band = Some(band);
        self
    }

    /// Set the packet-loss ceiling, inclusive.
    #[must_use]
    pub fn with_max_loss(mut self, ceiling: f64) -> Self {
        self.max_loss = Some(ceiling);
        self
    }

    /// Whether no criterion at all is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max_generation_ms.is_none()
            && self.encapsulation_band.is_none()
            && self.decapsulation_band.is_none()
            && self.required_state.is_none()
            && self.latency_band.is_none()
            && self.max_loss.is_none()
            && !self.require_key_match
    }

    /// Validates the criteria.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigurationError`] when the name is empty,
    /// no criterion is declared, a band is inverted or non-finite, a
    /// ceiling is negative or non-finite, or the loss ceiling falls
    /// outside `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigurationError(
                "checkpoint name must not be empty".to_string(),
            ));
        }
        if self.is_empty() {
            return Err(CoreError::ConfigurationError(format!(
                "checkpoint {} declares no criteria",
                self.name
            )));
        }
        if let Some(ceiling) = self.max_generation_ms {
            if !ceiling.is_finite() || ceiling < 0.0 {
                return Err(CoreError::ConfigurationError(format!(
                    "generation ceiling must be finite and non-negative, got {ceiling}"
                )));
            }
        }
        if let Some(band) = self.encapsulation_band {
            band.validate("encapsulation")?;
        }
        if let Some(band) = self.decapsulation_band {
            band.validate("decapsulation")?;
        }
        if let Some(band) = self.latency_band {
            band.validate("latency")?;
        }
        if let Some(ceiling) = self.max_loss {
            if !(0.0..=1.0).contains(&ceiling) {
                return Err(CoreError::ConfigurationError(format!(
                    "loss ceiling must be within [0, 1], got {ceiling}"
                )));
            }
        }
        Ok(())
    }
}

/// Verdict of one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    /// Criterion identifier, e.g. `"latency"`.
    pub name: String,
    /// The value observed in the record, rendered for reporting.
    pub observed: String,
    /// The declared acceptance threshold, rendered for reporting.
    pub expected: String,
    /// Whether the observed value satisfies the threshold.
    pub passed: bool,
}

/// Ordered verdict of one checkpoint evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChecklistVerdict {
    checkpoint: String,
    results: Vec<CriterionResult>,
    passed: bool,
}

impl ChecklistVerdict {
    /// Checkpoint identifier these results belong to.
    #[must_use]
    pub fn checkpoint(&self) -> &str {
        &self.checkpoint
    }

    /// Per-criterion verdicts, in declaration order.
    #[must_use]
    pub fn results(&self) -> &[CriterionResult] {
        &self.results
    }

    /// Overall verdict: the conjunction of every criterion.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// The criteria that failed, in declaration order.
    #[must_use]
    pub fn failed_criteria(&self) -> Vec<&CriterionResult> {
        self.results.iter().filter(|r| !r.passed).collect()
    }
}

/// Judges recorded runs against checklist criteria.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecklistEvaluator;

impl ChecklistEvaluator {
    /// Creates an evaluator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Evaluates `record` against `criteria` and returns the verdict.
    ///
    /// Criteria are validated first; the record is never mutated. The
    /// verdict lists one result per declared criterion in a fixed order:
    /// key integrity, final state, generation, encapsulation,
    /// decapsulation, latency, packet loss.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigurationError`] when the criteria fail
    /// validation. A record that misses a declared observable is not an
    /// error: that criterion is reported as failed.
    pub fn evaluate(
        &self,
        record: &MetricsRecord,
        criteria: &ChecklistCriteria,
    ) -> Result<ChecklistVerdict> {
        criteria.validate()?;

        let mut results = Vec::new();

        if criteria.require_key_match {
            let matched = record.handshake().matched();
            results.push(CriterionResult {
                name: "key-integrity".to_string(),
                observed: if matched { "secrets match" } else { "secrets differ" }.to_string(),
                expected: "secrets match".to_string(),
                passed: matched,
            });
        }

        if let Some(required) = criteria.required_state {
            let observed = record.final_state();
            results.push(CriterionResult {
                name: "final-state".to_string(),
                observed: observed.to_string(),
                expected: required.to_string(),
                passed: observed == required,
            });
        }

        if let Some(ceiling) = criteria.max_generation_ms {
            results.push(Self::ceiling_criterion(
                "generation-time",
                record.handshake().phase_elapsed_ms(HandshakePhase::Generation),
                ceiling,
            ));
        }

        if let Some(band) = criteria.encapsulation_band {
            results.push(Self::band_criterion(
                "encapsulation-time",
                record.handshake().phase_elapsed_ms(HandshakePhase::Encapsulation),
                band,
            ));
        }

        if let Some(band) = criteria.decapsulation_band {
            results.push(Self::band_criterion(
                "decapsulation-time",
                record.handshake().phase_elapsed_ms(HandshakePhase::Decapsulation),
                band,
            ));
        }

        if let Some(band) = criteria.latency_band {
            results.push(Self::band_criterion(
                "latency",
                record.network().map(|n| n.latency_ms),
                band,
            ));
        }

        if let Some(ceiling) = criteria.max_loss {
            let observed = record.network().map(|n| n.packet_loss);
            results.push(CriterionResult {
                name: "packet-loss".to_string(),
                observed: observed.map_or_else(|| "unavailable".to_string(), |v| format!("{v:.4}")),
                expected: format!("at most {ceiling:.4}"),
                passed: observed.is_some_and(|v| v <= ceiling),
            });
        }

        let passed = results.iter().all(|r| r.passed);
        for result in &results {
            tracing::debug!(
                checkpoint = %criteria.name,
                criterion = %result.name,
                observed = %result.observed,
                expected = %result.expected,
                passed = result.passed,
                "criterion judged"
            );
        }
        tracing::info!(checkpoint = %criteria.name, passed, "checklist evaluated");

        Ok(ChecklistVerdict { checkpoint: criteria.name.clone(), results, passed })
    }

    fn ceiling_criterion(name: &str, observed: Option<f64>, ceiling: f64) -> CriterionResult {
        CriterionResult {
            name: name.to_string(),
            observed: observed
                .map_or_else(|| "unavailable".to_string(), |v| format!("{v:.1} ms")),
            expected: format!("at most {ceiling:.1} ms"),
            passed: observed.is_some_and(|v| v <= ceiling),
        }
    }

    fn band_criterion(name: &str, observed: Option<f64>, band: Band) -> CriterionResult {
        CriterionResult {
            name: name.to_string(),
            observed: observed
                .map_or_else(|| "unavailable".to_string(), |v| format!("{v:.1} ms")),
            expected: format!("within [{:.1}, {:.1}] ms", band.min, band.max),
            passed: observed.is_some_and(|v| band.contains(v)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{
        config::AlgorithmProfile,
        record::{HandshakeResult, MetricsRecorder, NetworkSample, PhaseSample},
    };

    fn classical_record(latency_ms: f64, packet_loss: f64) -> MetricsRecord {
        let handshake = HandshakeResult::new(
            vec![
                PhaseSample::new(HandshakePhase::Generation, 103.0),
                PhaseSample::new(HandshakePhase::Negotiation, 50.4),
            ],
            vec![0x11; 32],
            vec![0x11; 32],
            true,
            32,
            None,
        );
        MetricsRecorder::new()
            .record(
                &AlgorithmProfile::classical(),
                handshake,
                TunnelState::Active,
                Some(NetworkSample { latency_ms, packet_loss }),
            )
            .unwrap()
    }

    fn failed_record() -> MetricsRecord {
        let handshake = HandshakeResult::new(
            vec![PhaseSample::new(HandshakePhase::Generation, 103.0)],
            vec![0x11; 32],
            vec![0x22; 32],
            false,
            32,
            None,
        );
        MetricsRecorder::new()
            .record(&AlgorithmProfile::classical(), handshake, TunnelState::Failed, None)
            .unwrap()
    }

    fn post_quantum_record(encaps_ms: f64, decaps_ms: f64) -> MetricsRecord {
        let handshake = HandshakeResult::new(
            vec![
                PhaseSample::new(HandshakePhase::Generation, 166.2),
                PhaseSample::new(HandshakePhase::Encapsulation, encaps_ms),
                PhaseSample::new(HandshakePhase::Decapsulation, decaps_ms),
            ],
            vec![0x33; 32],
            vec![0x33; 32],
            true,
            1184,
            Some(1088),
        );
        MetricsRecorder::new()
            .record(
                &AlgorithmProfile::post_quantum(),
                handshake,
                TunnelState::Active,
                Some(NetworkSample { latency_ms: 18.5, packet_loss: 0.0 }),
            )
            .unwrap()
    }

    #[test]
    fn test_stock_criteria_validate() {
        ChecklistCriteria::classical_checkpoint().validate().unwrap();
        ChecklistCriteria::post_quantum_checkpoint().validate().unwrap();
    }

    #[test]
    fn test_empty_criteria_rejected() {
        let result = ChecklistEvaluator::new()
            .evaluate(&classical_record(18.5, 0.0), &ChecklistCriteria::new("CP-X"));
        assert!(matches!(result, Err(CoreError::ConfigurationError(_))));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let criteria = ChecklistCriteria::new("CP-X").with_latency_band(Band::new(25.0, 15.0));
        let result = ChecklistEvaluator::new().evaluate(&classical_record(18.5, 0.0), &criteria);
        assert!(matches!(result, Err(CoreError::ConfigurationError(_))));
    }

    #[test]
    fn test_loss_ceiling_outside_unit_interval_rejected() {
        let criteria = ChecklistCriteria::new("CP-X").with_max_loss(1.2);
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn test_all_criteria_pass_on_nominal_classical_run() {
        let verdict = ChecklistEvaluator::new()
            .evaluate(&classical_record(18.5, 0.0), &ChecklistCriteria::classical_checkpoint())
            .unwrap();
        assert!(verdict.passed());
        assert_eq!(verdict.checkpoint(), "CP-01");
        assert!(verdict.failed_criteria().is_empty());
    }

    #[test]
    fn test_latency_below_band_fails_even_when_rest_passes() {
        // The historically observed 11.7 ms sits below the declared
        // 15-25 ms acceptance band and must fail that criterion.
        let verdict = ChecklistEvaluator::new()
            .evaluate(&classical_record(11.7, 0.0), &ChecklistCriteria::classical_checkpoint())
            .unwrap();
        assert!(!verdict.passed());
        let failed = verdict.failed_criteria();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].name, "latency");
        assert_eq!(failed[0].observed, "11.7 ms");
    }

    #[test]
    fn test_band_bounds_are_inclusive() {
        let band = Band::new(15.0, 25.0);
        assert!(band.contains(15.0));
        assert!(band.contains(25.0));
        assert!(!band.contains(14.999));
        assert!(!band.contains(25.001));
    }

    #[test]
    fn test_loss_at_ceiling_passes_above_fails() {
        let criteria = ChecklistCriteria::new("CP-X").with_max_loss(0.01);
        let evaluator = ChecklistEvaluator::new();

        let at = evaluator.evaluate(&classical_record(18.5, 0.01), &criteria).unwrap();
        assert!(at.passed());

        let above = evaluator.evaluate(&classical_record(18.5, 0.0101), &criteria).unwrap();
        assert!(!above.passed());
    }

    #[test]
    fn test_post_quantum_checkpoint_passes_on_nominal_run() {
        let verdict = ChecklistEvaluator::new()
            .evaluate(&post_quantum_record(64.8, 74.1), &ChecklistCriteria::post_quantum_checkpoint())
            .unwrap();
        assert!(verdict.passed());
        assert_eq!(verdict.results().len(), 7);
    }

    #[test]
    fn test_encapsulation_outside_band_fails() {
        let verdict = ChecklistEvaluator::new()
            .evaluate(&post_quantum_record(95.0, 74.1), &ChecklistCriteria::post_quantum_checkpoint())
            .unwrap();
        assert!(!verdict.passed());
        assert_eq!(verdict.failed_criteria()[0].name, "encapsulation-time");
    }

    #[test]
    fn test_unavailable_observable_is_failed_not_skipped() {
        // A failed tunnel has no network sample; latency and loss must be
        // reported failed, not dropped from the verdict.
        let criteria = ChecklistCriteria::new("CP-X")
            .with_latency_band(Band::new(15.0, 25.0))
            .with_max_loss(0.01);
        let verdict = ChecklistEvaluator::new().evaluate(&failed_record(), &criteria).unwrap();
        assert!(!verdict.passed());
        assert_eq!(verdict.results().len(), 2);
        for result in verdict.results() {
            assert_eq!(result.observed, "unavailable");
            assert!(!result.passed);
        }
    }

    #[test]
    fn test_phase_criterion_on_family_without_phase_fails() {
        let criteria = ChecklistCriteria::new("CP-X").with_encapsulation_band(Band::new(50.0, 80.0));
        let verdict =
            ChecklistEvaluator::new().evaluate(&classical_record(18.5, 0.0), &criteria).unwrap();
        assert!(!verdict.passed());
        assert_eq!(verdict.results()[0].observed, "unavailable");
    }

    #[test]
    fn test_mismatched_secrets_fail_key_integrity() {
        let criteria = ChecklistCriteria::new("CP-X").with_key_match_required();
        let verdict = ChecklistEvaluator::new().evaluate(&failed_record(), &criteria).unwrap();
        assert!(!verdict.passed());
        assert_eq!(verdict.results()[0].name, "key-integrity");
        assert_eq!(verdict.results()[0].observed, "secrets differ");
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let record = classical_record(18.5, 0.0);
        let criteria = ChecklistCriteria::classical_checkpoint();
        let evaluator = ChecklistEvaluator::new();
        let first = evaluator.evaluate(&record, &criteria).unwrap();
        let second = evaluator.evaluate(&record, &criteria).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_results_keep_declaration_order() {
        let verdict = ChecklistEvaluator::new()
            .evaluate(&classical_record(18.5, 0.0), &ChecklistCriteria::classical_checkpoint())
            .unwrap();
        let names: Vec<&str> = verdict.results().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["key-integrity", "final-state", "generation-time", "latency", "packet-loss"]
        );
    }
}
