use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::error::SecurityError;
use crate::gate::Decision;

/// Counters for authorization outcomes.
#[derive(Clone)]
pub struct AuthzMetrics {
    registry: Registry,
    decisions: IntCounterVec,
}

impl AuthzMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new(
                "authz_decisions_total",
                "Count of authority checks grouped by outcome",
            ),
            &["outcome"],
        )?;
        registry.register(Box::new(decisions.clone()))?;

        Ok(Self { registry, decisions })
    }

    pub fn record(&self, outcome: &Result<Decision, SecurityError>) {
        let label = match outcome {
            Ok(decision) => decision.as_str(),
            Err(SecurityError::InvalidAuthority(_)) => "invalid_authority",
            Err(SecurityError::Forbidden { .. }) => "skip",
            Err(SecurityError::Config(_)) => "invalid_config",
        };
        self.decisions.with_label_values(&[label]).inc();
    }

    pub fn decision_count(&self, outcome: &str) -> u64 {
        self.decisions.with_label_values(&[outcome]).get()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}
