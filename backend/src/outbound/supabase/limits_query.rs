//! Supabase implementation of [`PackageLimitsQuery`].
//!
//! Each method maps onto one stored procedure:
//!
//! | method | procedure |
//! |---|---|
//! | `check_package_limits` | `check_package_limits(p_user_id, p_action_type, p_soft_check)` |
//! | `get_user_effective_limits` | `get_user_effective_limits(p_user_id)` |
//! | `get_user_usage_stats` | `get_user_usage_stats(p_user_id)` |
//! | `get_user_active_subscription` | `get_user_active_subscription(p_user_id)` |

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::client::{RestFailure, SupabaseClient};
use super::dto::{ActiveSubscriptionRow, EffectiveLimitsRow, PackageLimitsRow, UsageStatsRow};
use crate::domain::ports::{PackageLimitsQuery, PackageLimitsQueryError};
use crate::domain::{
    ActionType, ActiveSubscription, EffectiveLimits, LimitCheckMode, PackageLimits, UsageStats,
    UserId,
};

#[derive(Serialize)]
struct UserArgs<'a> {
    p_user_id: &'a UserId,
}

#[derive(Serialize)]
struct CheckArgs<'a> {
    p_user_id: &'a UserId,
    p_action_type: ActionType,
    p_soft_check: bool,
}

impl From<RestFailure> for PackageLimitsQueryError {
    fn from(failure: RestFailure) -> Self {
        match failure {
            RestFailure::LimitExceeded { detail } => Self::limit_exceeded(detail),
            RestFailure::Timeout(message) => Self::timeout(message),
            RestFailure::Connection(message) => Self::connection(message),
            RestFailure::Rejected { status, message } => Self::rejected(status, message),
            RestFailure::Decode(message) => Self::decode(message),
        }
    }
}

/// Limit queries answered by the Supabase stored procedures.
#[derive(Clone)]
pub struct SupabasePackageLimitsQuery {
    client: SupabaseClient,
}

impl SupabasePackageLimitsQuery {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    async fn fetch<Row, T>(
        &self,
        function: &str,
        user_id: &UserId,
    ) -> Result<Option<T>, PackageLimitsQueryError>
    where
        Row: DeserializeOwned,
        T: TryFrom<Row, Error = String>,
    {
        let row: Option<Row> = self
            .client
            .rpc(function, &UserArgs { p_user_id: user_id })
            .await?;
        into_domain(row)
    }
}

fn into_domain<Row, T>(row: Option<Row>) -> Result<Option<T>, PackageLimitsQueryError>
where
    T: TryFrom<Row, Error = String>,
{
    row.map(T::try_from)
        .transpose()
        .map_err(PackageLimitsQueryError::decode)
}

#[async_trait]
impl PackageLimitsQuery for SupabasePackageLimitsQuery {
    async fn check_package_limits(
        &self,
        user_id: &UserId,
        action: ActionType,
        mode: LimitCheckMode,
    ) -> Result<Option<PackageLimits>, PackageLimitsQueryError> {
        let args = CheckArgs {
            p_user_id: user_id,
            p_action_type: action,
            p_soft_check: mode.is_soft(),
        };
        let row: Option<PackageLimitsRow> =
            self.client.rpc("check_package_limits", &args).await?;
        into_domain(row)
    }

    async fn get_user_effective_limits(
        &self,
        user_id: &UserId,
    ) -> Result<Option<EffectiveLimits>, PackageLimitsQueryError> {
        self.fetch::<EffectiveLimitsRow, _>("get_user_effective_limits", user_id)
            .await
    }

    async fn get_user_usage_stats(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UsageStats>, PackageLimitsQueryError> {
        self.fetch::<UsageStatsRow, _>("get_user_usage_stats", user_id)
            .await
    }

    async fn get_user_active_subscription(
        &self,
        user_id: &UserId,
    ) -> Result<Option<ActiveSubscription>, PackageLimitsQueryError> {
        self.fetch::<ActiveSubscriptionRow, _>("get_user_active_subscription", user_id)
            .await
    }
}

#[cfg(test)]
#[path = "limits_query_tests.rs"]
mod tests;
