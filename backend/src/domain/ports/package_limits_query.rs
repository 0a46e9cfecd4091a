//! Port for the backend limit procedures.
//!
//! The four procedures compute quota state on the backend; every call is a
//! fresh round trip. Each returns at most one row.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    ActionType, ActiveSubscription, EffectiveLimits, LimitCheckMode, PackageLimits,
    SubscriptionStatus, UsageStats, UserId,
};

/// Errors raised by [`PackageLimitsQuery`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PackageLimitsQueryError {
    /// The backend refused a hard check.
    #[error("package limit exceeded: {detail}")]
    LimitExceeded {
        /// User-facing reason without transport prefix.
        detail: String,
    },
    /// The backend could not be reached.
    #[error("limits backend connection failed: {message}")]
    Connection { message: String },
    /// The backend did not answer in time.
    #[error("limits backend timed out: {message}")]
    Timeout { message: String },
    /// The backend answered with an error status.
    #[error("limits backend rejected the call with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// The response body did not match the contract.
    #[error("limits backend returned an invalid payload: {message}")]
    Decode { message: String },
}

impl PackageLimitsQueryError {
    pub fn limit_exceeded(detail: impl Into<String>) -> Self {
        Self::LimitExceeded {
            detail: detail.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Typed access to the limit procedures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageLimitsQuery: Send + Sync {
    /// `check_package_limits(p_user_id, p_action_type, p_soft_check)`.
    ///
    /// In [`LimitCheckMode::Hard`] a refusal surfaces as
    /// [`PackageLimitsQueryError::LimitExceeded`]; soft checks never fail for
    /// quota reasons.
    async fn check_package_limits(
        &self,
        user_id: &UserId,
        action: ActionType,
        mode: LimitCheckMode,
    ) -> Result<Option<PackageLimits>, PackageLimitsQueryError>;

    /// `get_user_effective_limits(p_user_id)`.
    async fn get_user_effective_limits(
        &self,
        user_id: &UserId,
    ) -> Result<Option<EffectiveLimits>, PackageLimitsQueryError>;

    /// `get_user_usage_stats(p_user_id)`.
    async fn get_user_usage_stats(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UsageStats>, PackageLimitsQueryError>;

    /// `get_user_active_subscription(p_user_id)`.
    async fn get_user_active_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ActiveSubscription>, PackageLimitsQueryError>;
}

const FIXTURE_PACKAGE: &str = "Fixture";
const FIXTURE_LIMIT: u32 = 1_000;

/// Fixture that grants a generous package to every user.
///
/// Used when the server runs without a configured backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePackageLimitsQuery;

#[async_trait]
impl PackageLimitsQuery for FixturePackageLimitsQuery {
    async fn check_package_limits(
        &self,
        _user_id: &UserId,
        _action: ActionType,
        _mode: LimitCheckMode,
    ) -> Result<Option<PackageLimits>, PackageLimitsQueryError> {
        Ok(Some(PackageLimits {
            can_perform_action: true,
            current_count: 0,
            max_allowed: FIXTURE_LIMIT,
            package_name: FIXTURE_PACKAGE.to_owned(),
            usage_percentage: Some(0),
            is_at_soft_limit: Some(false),
            error_message: None,
        }))
    }

    async fn get_user_effective_limits(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<EffectiveLimits>, PackageLimitsQueryError> {
        Ok(Some(EffectiveLimits {
            package_name: FIXTURE_PACKAGE.to_owned(),
            max_clients: FIXTURE_LIMIT,
            max_pets: FIXTURE_LIMIT,
            max_services: FIXTURE_LIMIT,
            max_specializations: FIXTURE_LIMIT,
            addon_clients: 0,
            addon_pets: 0,
        }))
    }

    async fn get_user_usage_stats(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<UsageStats>, PackageLimitsQueryError> {
        Ok(Some(UsageStats::default()))
    }

    async fn get_user_active_subscription(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<ActiveSubscription>, PackageLimitsQueryError> {
        Ok(Some(ActiveSubscription {
            subscription_id: Uuid::nil(),
            package_id: Uuid::nil(),
            package_name: FIXTURE_PACKAGE.to_owned(),
            status: SubscriptionStatus::Active,
            start_date: Utc::now(),
            end_date: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[tokio::test]
    async fn fixture_allows_every_action() {
        let query = FixturePackageLimitsQuery;
        let user = UserId::random();
        for action in ActionType::ALL {
            let limits = query
                .check_package_limits(&user, action, LimitCheckMode::Hard)
                .await
                .expect("fixture check")
                .expect("fixture row");
            assert!(limits.allows_action());
        }
    }

    #[rstest]
    #[case(
        PackageLimitsQueryError::rejected(500, "boom"),
        "limits backend rejected the call with status 500: boom"
    )]
    #[case(
        PackageLimitsQueryError::limit_exceeded("Osiągnięto limit klientów"),
        "package limit exceeded: Osiągnięto limit klientów"
    )]
    fn error_messages_are_descriptive(
        #[case] err: PackageLimitsQueryError,
        #[case] expected: &str,
    ) {
        assert_eq!(err.to_string(), expected);
    }
}
