//! Port for recording limit policy decisions.
//!
//! Lets operators see how often users are blocked or warned without coupling
//! the policy to a metrics backend.

use async_trait::async_trait;

use crate::domain::ActionType;

/// Errors exposed when recording decision metrics.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitDecisionMetricsError {
    /// Metric exporter rejected the write.
    #[error("limit decision metrics exporter failed: {message}")]
    Export { message: String },
}

impl LimitDecisionMetricsError {
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }
}

/// Result of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitDecisionOutcome {
    /// Action may proceed.
    Allowed,
    /// Action may proceed but usage crossed the advisory threshold.
    Approaching,
    /// Action was refused for quota reasons.
    Blocked,
    /// Quota could not be verified; action refused.
    Error,
}

impl LimitDecisionOutcome {
    /// Metric label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allowed => "allowed",
            Self::Approaching => "approaching",
            Self::Blocked => "blocked",
            Self::Error => "error",
        }
    }
}

/// One decision to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitDecision {
    /// Checked dimension.
    pub action: ActionType,
    /// Outcome of the check.
    pub outcome: LimitDecisionOutcome,
    /// Anonymised user scope (first 8 hex chars of SHA-256 of the user id).
    pub user_scope: String,
}

/// Metrics port for limit decisions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LimitDecisionMetrics: Send + Sync {
    /// Record a single decision.
    async fn record(&self, decision: &LimitDecision) -> Result<(), LimitDecisionMetricsError>;
}

/// Discards every decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpLimitDecisionMetrics;

#[async_trait]
impl LimitDecisionMetrics for NoOpLimitDecisionMetrics {
    async fn record(&self, _decision: &LimitDecision) -> Result<(), LimitDecisionMetricsError> {
        Ok(())
    }
}
