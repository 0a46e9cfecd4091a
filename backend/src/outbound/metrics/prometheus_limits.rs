//! Prometheus adapter for limit decision metrics.

use async_trait::async_trait;
use prometheus::{CounterVec, Opts, Registry};

use crate::domain::ports::{LimitDecision, LimitDecisionMetrics, LimitDecisionMetricsError};

const METRIC_NAME: &str = "petsflow_limit_decisions_total";

/// Counts policy decisions by action, outcome and anonymised user scope.
///
/// - **Name**: `petsflow_limit_decisions_total`
/// - **Labels**: `action` (`clients`, `pets`, `services`, `specializations`),
///   `outcome` (`allowed`, `approaching`, `blocked`, `error`) and
///   `user_scope` (8-character hex hash of the user id)
pub struct PrometheusLimitDecisionMetrics {
    decisions_total: CounterVec,
}

impl PrometheusLimitDecisionMetrics {
    /// Create and register the counter with `registry`.
    ///
    /// # Errors
    ///
    /// Fails when a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let decisions_total = CounterVec::new(
            Opts::new(METRIC_NAME, "Package limit decisions by action and outcome"),
            &["action", "outcome", "user_scope"],
        )?;
        registry.register(Box::new(decisions_total.clone()))?;
        Ok(Self { decisions_total })
    }
}

#[async_trait]
impl LimitDecisionMetrics for PrometheusLimitDecisionMetrics {
    async fn record(&self, decision: &LimitDecision) -> Result<(), LimitDecisionMetricsError> {
        self.decisions_total
            .get_metric_with_label_values(&[
                decision.action.as_str(),
                decision.outcome.as_str(),
                decision.user_scope.as_str(),
            ])
            .map_err(|err| LimitDecisionMetricsError::export(err.to_string()))?
            .inc();
        Ok(())
    }
}
