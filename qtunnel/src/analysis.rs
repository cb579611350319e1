//! Cross-scenario analysis of recorded runs.
//!
//! Quantifies what moving from the classical to the post-quantum
//! key exchange costs: total handshake time overhead and the growth of
//! the public material exchanged during the handshake.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]

use serde::Serialize;

use qtunnel_core::{
    config::AlgorithmFamily,
    error::{CoreError, Result},
    record::MetricsRecord,
};

/// Overhead of a post-quantum run relative to a classical baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioComparison {
    /// Total classical handshake time, milliseconds.
    pub classical_total_ms: f64,
    /// Total post-quantum handshake time, milliseconds.
    pub post_quantum_total_ms: f64,
    /// Absolute handshake overhead, milliseconds.
    pub overhead_ms: f64,
    /// Relative handshake overhead, percent of the classical baseline.
    pub overhead_percent: f64,
    /// Additional public-key bytes the post-quantum handshake exchanges.
    pub public_key_overhead_bytes: i64,
}

/// Compares a post-quantum run against its classical baseline.
///
/// # Errors
///
/// Returns [`CoreError::ConfigurationError`] when the records' families
/// are not classical resp. post-quantum, or the classical baseline
/// measured a zero-length handshake.
pub fn compare_records(
    classical: &MetricsRecord,
    post_quantum: &MetricsRecord,
) -> Result<ScenarioComparison> {
    if classical.family() != AlgorithmFamily::Classical {
        return Err(CoreError::ConfigurationError(format!(
            "baseline record is {}, expected classical",
            classical.family()
        )));
    }
    if post_quantum.family() != AlgorithmFamily::PostQuantum {
        return Err(CoreError::ConfigurationError(format!(
            "comparison record is {}, expected post_quantum",
            post_quantum.family()
        )));
    }

    let classical_total_ms = classical.handshake().total_ms();
    let post_quantum_total_ms = post_quantum.handshake().total_ms();
    if classical_total_ms <= 0.0 {
        return Err(CoreError::ConfigurationError(
            "classical baseline handshake measured no time".to_string(),
        ));
    }

    let overhead_ms = post_quantum_total_ms - classical_total_ms;
    let comparison = ScenarioComparison {
        classical_total_ms,
        post_quantum_total_ms,
        overhead_ms,
        overhead_percent: overhead_ms / classical_total_ms * 100.0,
        public_key_overhead_bytes: post_quantum.handshake().public_key_len() as i64
            - classical.handshake().public_key_len() as i64,
    };

    tracing::info!(
        overhead_ms = comparison.overhead_ms,
        overhead_percent = comparison.overhead_percent,
        "scenarios compared"
    );

    Ok(comparison)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::float_cmp)]
mod tests {
    use super::*;
    use qtunnel_core::{
        config::{AlgorithmProfile, HandshakePhase},
        record::{HandshakeResult, MetricsRecorder, NetworkSample, PhaseSample},
        state::TunnelState,
    };

    fn record(profile: &AlgorithmProfile, phases: Vec<PhaseSample>, pk_len: usize) -> MetricsRecord {
        let handshake =
            HandshakeResult::new(phases, vec![1; 32], vec![1; 32], true, pk_len, None);
        MetricsRecorder::new()
            .record(
                profile,
                handshake,
                TunnelState::Active,
                Some(NetworkSample { latency_ms: 18.5, packet_loss: 0.0 }),
            )
            .unwrap()
    }

    fn classical_record(total_ms: f64) -> MetricsRecord {
        record(
            &AlgorithmProfile::classical(),
            vec![PhaseSample::new(HandshakePhase::Generation, total_ms)],
            32,
        )
    }

    fn post_quantum_record(total_ms: f64) -> MetricsRecord {
        record(
            &AlgorithmProfile::post_quantum(),
            vec![PhaseSample::new(HandshakePhase::Generation, total_ms)],
            1184,
        )
    }

    #[test]
    fn test_overhead_arithmetic() {
        let comparison =
            compare_records(&classical_record(150.0), &post_quantum_record(300.0)).unwrap();
        assert_eq!(comparison.overhead_ms, 150.0);
        assert_eq!(comparison.overhead_percent, 100.0);
        assert_eq!(comparison.public_key_overhead_bytes, 1184 - 32);
    }

    #[test]
    fn test_faster_post_quantum_yields_negative_overhead() {
        let comparison =
            compare_records(&classical_record(200.0), &post_quantum_record(150.0)).unwrap();
        assert!(comparison.overhead_ms < 0.0);
        assert_eq!(comparison.overhead_percent, -25.0);
    }

    #[test]
    fn test_swapped_families_are_rejected() {
        let result = compare_records(&post_quantum_record(300.0), &classical_record(150.0));
        assert!(matches!(result, Err(CoreError::ConfigurationError(_))));
    }

    #[test]
    fn test_comparison_serializes_for_reporting() {
        let comparison =
            compare_records(&classical_record(150.0), &post_quantum_record(300.0)).unwrap();
        let json = serde_json::to_value(&comparison).unwrap();
        assert_eq!(json["overhead_ms"], 150.0);
        assert_eq!(json["public_key_overhead_bytes"], 1152);
    }

    #[test]
    fn test_zero_length_baseline_is_rejected() {
        let result = compare_records(&classical_record(0.0), &post_quantum_record(300.0));
        assert!(matches!(result, Err(CoreError::ConfigurationError(_))));
    }
}
