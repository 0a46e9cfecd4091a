//! Wire rows returned by the PostgREST RPC endpoints.
//!
//! Counts arrive as JSON integers of unknown sign; conversion to the domain
//! rejects negatives instead of clamping them.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{
    ActiveSubscription, EffectiveLimits, PackageLimits, SubscriptionStatus, UsageStats,
};

/// Error body PostgREST sends for a failed request.
#[derive(Debug, Deserialize)]
pub(super) struct PostgrestErrorDto {
    pub(super) code: Option<String>,
    pub(super) message: Option<String>,
    pub(super) details: Option<String>,
}

fn count(field: &str, value: i64) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{field} out of range: {value}"))
}

fn optional_count(field: &str, value: Option<i64>) -> Result<Option<u32>, String> {
    value.map(|raw| count(field, raw)).transpose()
}

#[derive(Debug, Deserialize)]
pub(super) struct PackageLimitsRow {
    can_perform_action: bool,
    current_count: i64,
    max_allowed: i64,
    package_name: String,
    usage_percentage: Option<i64>,
    is_at_soft_limit: Option<bool>,
    error_message: Option<String>,
}

impl TryFrom<PackageLimitsRow> for PackageLimits {
    type Error = String;

    fn try_from(row: PackageLimitsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            can_perform_action: row.can_perform_action,
            current_count: count("current_count", row.current_count)?,
            max_allowed: count("max_allowed", row.max_allowed)?,
            package_name: row.package_name,
            usage_percentage: optional_count("usage_percentage", row.usage_percentage)?,
            is_at_soft_limit: row.is_at_soft_limit,
            error_message: row.error_message,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct EffectiveLimitsRow {
    package_name: String,
    max_clients: i64,
    max_pets: i64,
    max_services: i64,
    max_specializations: i64,
    #[serde(default)]
    addon_clients: i64,
    #[serde(default)]
    addon_pets: i64,
}

impl TryFrom<EffectiveLimitsRow> for EffectiveLimits {
    type Error = String;

    fn try_from(row: EffectiveLimitsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            package_name: row.package_name,
            max_clients: count("max_clients", row.max_clients)?,
            max_pets: count("max_pets", row.max_pets)?,
            max_services: count("max_services", row.max_services)?,
            max_specializations: count("max_specializations", row.max_specializations)?,
            addon_clients: count("addon_clients", row.addon_clients)?,
            addon_pets: count("addon_pets", row.addon_pets)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UsageStatsRow {
    clients_count: i64,
    pets_count: i64,
    services_count: i64,
    specializations_count: i64,
    #[serde(default)]
    active_visits_count: i64,
}

impl TryFrom<UsageStatsRow> for UsageStats {
    type Error = String;

    fn try_from(row: UsageStatsRow) -> Result<Self, Self::Error> {
        Ok(Self {
            clients_count: count("clients_count", row.clients_count)?,
            pets_count: count("pets_count", row.pets_count)?,
            services_count: count("services_count", row.services_count)?,
            specializations_count: count("specializations_count", row.specializations_count)?,
            active_visits_count: count("active_visits_count", row.active_visits_count)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ActiveSubscriptionRow {
    subscription_id: Uuid,
    package_id: Uuid,
    package_name: String,
    status: SubscriptionStatus,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
}

impl TryFrom<ActiveSubscriptionRow> for ActiveSubscription {
    type Error = String;

    fn try_from(row: ActiveSubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Self {
            subscription_id: row.subscription_id,
            package_id: row.package_id,
            package_name: row.package_name,
            status: row.status,
            start_date: row.start_date,
            end_date: row.end_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn limits_row_maps_counts() {
        let row: PackageLimitsRow = serde_json::from_str(
            r#"{"can_perform_action":true,"current_count":25,"max_allowed":30,
                "package_name":"Zaawansowany","usage_percentage":83,"is_at_soft_limit":true}"#,
        )
        .expect("row decodes");
        let limits = PackageLimits::try_from(row).expect("valid counts");
        assert_eq!(limits.current_count, 25);
        assert_eq!(limits.usage_percentage, Some(83));
        assert!(limits.error_message.is_none());
    }

    #[rstest]
    fn negative_counts_are_rejected() {
        let row: UsageStatsRow = serde_json::from_str(
            r#"{"clients_count":-1,"pets_count":0,"services_count":0,"specializations_count":0}"#,
        )
        .expect("row decodes");
        let err = UsageStats::try_from(row).expect_err("negative count");
        assert!(err.contains("clients_count"));
    }

    #[rstest]
    fn subscription_row_parses_postgres_timestamps() {
        let row: ActiveSubscriptionRow = serde_json::from_str(
            r#"{"subscription_id":"00000000-0000-0000-0000-000000000001",
                "package_id":"00000000-0000-0000-0000-000000000002",
                "package_name":"Podstawowy","status":"trial",
                "start_date":"2026-02-01T00:00:00+00:00","end_date":null}"#,
        )
        .expect("row decodes");
        let subscription = ActiveSubscription::try_from(row).expect("valid row");
        assert_eq!(subscription.status, SubscriptionStatus::Trial);
        assert!(subscription.end_date.is_none());
    }
}
