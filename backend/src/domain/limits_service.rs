//! Limit queries and the policy that interprets them.
//!
//! [`PackageLimitsService`] wraps the [`PackageLimitsQuery`] port. It turns
//! refusals into [`PackageLimitError`], evaluates the allow / warn / block
//! policy and records every decision. Nothing is cached: each call re-fetches
//! the backend state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::domain::ports::{
    LimitDecision, LimitDecisionMetrics, LimitDecisionOutcome, NoOpLimitDecisionMetrics,
    PackageLimitsQuery, PackageLimitsQueryError,
};
use crate::domain::{
    ActionType, ActiveSubscription, EffectiveLimits, Error, LimitCheckMode, PackageLimitError,
    PackageLimits, UsageStats, UserId,
};

/// Message returned when the quota cannot be verified.
pub const VERIFICATION_FAILED_MESSAGE: &str = "Unable to verify package limits";

/// Errors raised by limit checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitCheckError {
    /// The package does not permit the action.
    #[error(transparent)]
    LimitExceeded(#[from] PackageLimitError),
    /// The backend failed for a reason unrelated to quotas.
    #[error(transparent)]
    Query(PackageLimitsQueryError),
}

/// Why a validation outcome was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    /// The limit is reached.
    LimitExceeded,
    /// Usage crossed the advisory threshold.
    ApproachingLimit,
    /// The quota could not be verified.
    Error,
}

/// Decision returned by [`PackageLimitsService::validate_action_before_execution`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Whether the caller may go ahead.
    pub can_proceed: bool,
    /// Reason for a refusal or warning.
    pub reason: Option<ValidationReason>,
    /// User-facing explanation.
    pub message: Option<String>,
}

impl ValidationOutcome {
    fn allowed() -> Self {
        Self {
            can_proceed: true,
            reason: None,
            message: None,
        }
    }

    fn approaching(usage_percent: u32) -> Self {
        Self {
            can_proceed: true,
            reason: Some(ValidationReason::ApproachingLimit),
            message: Some(format!("{usage_percent}% usage")),
        }
    }

    fn blocked(message: String) -> Self {
        Self {
            can_proceed: false,
            reason: Some(ValidationReason::LimitExceeded),
            message: Some(message),
        }
    }

    fn failed() -> Self {
        Self {
            can_proceed: false,
            reason: Some(ValidationReason::Error),
            message: Some(VERIFICATION_FAILED_MESSAGE.to_owned()),
        }
    }

    fn decision(&self) -> LimitDecisionOutcome {
        match self.reason {
            None => LimitDecisionOutcome::Allowed,
            Some(ValidationReason::ApproachingLimit) => LimitDecisionOutcome::Approaching,
            Some(ValidationReason::LimitExceeded) => LimitDecisionOutcome::Blocked,
            Some(ValidationReason::Error) => LimitDecisionOutcome::Error,
        }
    }
}

/// Limit query service and validation policy.
#[derive(Clone)]
pub struct PackageLimitsService {
    query: Arc<dyn PackageLimitsQuery>,
    metrics: Arc<dyn LimitDecisionMetrics>,
}

impl PackageLimitsService {
    /// Create a service that records no metrics.
    pub fn new(query: Arc<dyn PackageLimitsQuery>) -> Self {
        Self::with_metrics(query, Arc::new(NoOpLimitDecisionMetrics))
    }

    /// Create a service reporting decisions to `metrics`.
    pub fn with_metrics(
        query: Arc<dyn PackageLimitsQuery>,
        metrics: Arc<dyn LimitDecisionMetrics>,
    ) -> Self {
        Self { query, metrics }
    }

    /// Query the limits for one dimension.
    ///
    /// Soft checks return the backend row as is. Hard checks convert a
    /// refusal, or a row that does not allow the action, into
    /// [`LimitCheckError::LimitExceeded`]. A refusal raised by the backend is
    /// enriched with counts from a follow-up soft check when one succeeds.
    pub async fn check_package_limits(
        &self,
        user_id: &UserId,
        action: ActionType,
        mode: LimitCheckMode,
    ) -> Result<Option<PackageLimits>, LimitCheckError> {
        match self.query.check_package_limits(user_id, action, mode).await {
            Ok(Some(limits)) if mode == LimitCheckMode::Hard && !limits.allows_action() => Err(
                PackageLimitError::from_limits(&limits, action).into(),
            ),
            Ok(row) => Ok(row.map(PackageLimits::normalised)),
            Err(PackageLimitsQueryError::LimitExceeded { detail }) => {
                let refusal = PackageLimitError::new(detail, action);
                Err(self.enrich_refusal(user_id, refusal).await.into())
            }
            Err(err) => Err(LimitCheckError::Query(err)),
        }
    }

    async fn enrich_refusal(
        &self,
        user_id: &UserId,
        refusal: PackageLimitError,
    ) -> PackageLimitError {
        match self
            .query
            .check_package_limits(user_id, refusal.action_type, LimitCheckMode::Soft)
            .await
        {
            Ok(Some(limits)) => refusal.with_snapshot(&limits),
            Ok(None) => refusal,
            Err(err) => {
                debug!(error = %err, "could not fetch counts for limit refusal");
                refusal
            }
        }
    }

    /// Effective maximums including add-ons.
    pub async fn get_user_effective_limits(
        &self,
        user_id: &UserId,
    ) -> Result<Option<EffectiveLimits>, PackageLimitsQueryError> {
        self.query.get_user_effective_limits(user_id).await
    }

    /// Current resource counts.
    pub async fn get_user_usage_stats(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UsageStats>, PackageLimitsQueryError> {
        self.query.get_user_usage_stats(user_id).await
    }

    /// Subscription granting the user's limits.
    pub async fn get_user_active_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ActiveSubscription>, PackageLimitsQueryError> {
        self.query.get_user_active_subscription(user_id).await
    }

    /// Hard-check the action, failing when it is not permitted.
    ///
    /// A user without a limits row has no active package and is refused.
    pub async fn validate_package_limit(
        &self,
        user_id: &UserId,
        action: ActionType,
    ) -> Result<(), LimitCheckError> {
        let result = match self
            .check_package_limits(user_id, action, LimitCheckMode::Hard)
            .await
        {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(PackageLimitError::no_active_package(action).into()),
            Err(err) => Err(err),
        };
        let outcome = match &result {
            Ok(()) => LimitDecisionOutcome::Allowed,
            Err(LimitCheckError::LimitExceeded(_)) => LimitDecisionOutcome::Blocked,
            Err(LimitCheckError::Query(_)) => LimitDecisionOutcome::Error,
        };
        match &result {
            Ok(()) => debug!(%action, "package limit check passed"),
            Err(LimitCheckError::LimitExceeded(err)) => {
                info!(%action, reason = %err, "package limit check blocked action");
            }
            Err(LimitCheckError::Query(err)) => {
                warn!(%action, error = %err, "package limit check failed");
            }
        }
        self.record_decision(user_id, action, outcome).await;
        result
    }

    /// Decide whether the UI may start an action.
    ///
    /// Fails closed: a query error or a missing row refuses the action.
    pub async fn validate_action_before_execution(
        &self,
        user_id: &UserId,
        action: ActionType,
    ) -> ValidationOutcome {
        let outcome = match self
            .query
            .check_package_limits(user_id, action, LimitCheckMode::Soft)
            .await
        {
            Ok(Some(limits)) => Self::interpret(&limits, action),
            Ok(None) => {
                warn!(%action, "no package limits row for user");
                ValidationOutcome::failed()
            }
            Err(err) => {
                warn!(%action, error = %err, "package limit validation failed");
                ValidationOutcome::failed()
            }
        };
        match outcome.decision() {
            LimitDecisionOutcome::Allowed => debug!(%action, "action allowed"),
            LimitDecisionOutcome::Approaching | LimitDecisionOutcome::Blocked => {
                info!(%action, message = ?outcome.message, "action near or at package limit");
            }
            LimitDecisionOutcome::Error => {}
        }
        self.record_decision(user_id, action, outcome.decision()).await;
        outcome
    }

    fn interpret(limits: &PackageLimits, action: ActionType) -> ValidationOutcome {
        if !limits.allows_action() {
            let refusal = PackageLimitError::from_limits(limits, action);
            return ValidationOutcome::blocked(refusal.message);
        }
        if limits.is_approaching_limit() {
            return ValidationOutcome::approaching(limits.usage_percent());
        }
        ValidationOutcome::allowed()
    }

    async fn record_decision(
        &self,
        user_id: &UserId,
        action: ActionType,
        outcome: LimitDecisionOutcome,
    ) {
        let decision = LimitDecision {
            action,
            outcome,
            user_scope: user_scope_hash(user_id),
        };
        if let Err(err) = self.metrics.record(&decision).await {
            warn!(error = %err, "failed to record limit decision");
        }
    }
}

/// Anonymised user label: first 8 hex chars of the SHA-256 of the id.
pub fn user_scope_hash(user_id: &UserId) -> String {
    let digest = Sha256::digest(user_id.to_string().as_bytes());
    hex::encode(&digest[..4])
}

impl From<PackageLimitError> for Error {
    fn from(err: PackageLimitError) -> Self {
        Error::package_limit_exceeded(err.message.clone()).with_details(json!({
            "actionType": err.action_type,
            "currentCount": err.current_count,
            "maxAllowed": err.max_allowed,
            "packageName": err.package_name,
        }))
    }
}

impl From<PackageLimitsQueryError> for Error {
    fn from(err: PackageLimitsQueryError) -> Self {
        match err {
            PackageLimitsQueryError::LimitExceeded { detail } if !detail.trim().is_empty() => {
                Error::package_limit_exceeded(detail)
            }
            PackageLimitsQueryError::LimitExceeded { .. } => {
                Error::package_limit_exceeded("Package limit reached")
            }
            PackageLimitsQueryError::Connection { .. }
            | PackageLimitsQueryError::Timeout { .. } => {
                Error::service_unavailable(format!("limits backend unavailable: {err}"))
            }
            PackageLimitsQueryError::Rejected { .. } | PackageLimitsQueryError::Decode { .. } => {
                Error::internal(format!("limits backend error: {err}"))
            }
        }
    }
}

impl From<LimitCheckError> for Error {
    fn from(err: LimitCheckError) -> Self {
        match err {
            LimitCheckError::LimitExceeded(refusal) => refusal.into(),
            LimitCheckError::Query(query) => query.into(),
        }
    }
}

#[cfg(test)]
#[path = "limits_service_tests.rs"]
mod tests;
