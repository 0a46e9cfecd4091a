//! In-memory stand-in for the managed limits backend.
//!
//! Computes quota rows the way the backend procedures do: usage in whole
//! percent and a soft flag from 80% upwards. Inserts into counted tables bump
//! the matching count, so check-then-create flows can be observed end to end.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use petsflow::domain::ports::{
    BackendFailure, BackendFailureKind, CreateEntity, EntityRepositoryError, PackageLimitsQuery,
    PackageLimitsQueryError,
};
use petsflow::domain::{
    ActionType, ActiveSubscription, EffectiveLimits, LimitCheckMode, NewEntity, PackageLimits,
    SubscriptionStatus, UsageStats, UserId,
};
use uuid::Uuid;

const SOFT_THRESHOLD_PERCENT: u32 = 80;

#[derive(Debug, Default)]
struct Quota {
    package_name: String,
    max: HashMap<ActionType, u32>,
    current: HashMap<ActionType, u32>,
    refusal: Option<String>,
}

/// Backend double holding one user's package.
#[derive(Debug, Default)]
pub struct QuotaBackend {
    quota: Mutex<Quota>,
    unavailable: AtomicBool,
    limit_queries: AtomicUsize,
    writes: AtomicUsize,
}

impl QuotaBackend {
    /// Put the user on `package` holding `current` of `max` for `action`.
    pub fn set_usage(&self, package: &str, action: ActionType, current: u32, max: u32) {
        let mut quota = self.quota.lock().expect("quota lock");
        quota.package_name = package.to_owned();
        quota.max.insert(action, max);
        quota.current.insert(action, current);
    }

    /// Make hard checks fail with a raw backend message instead of a row.
    pub fn refuse_with(&self, message: &str) {
        self.quota.lock().expect("quota lock").refusal = Some(message.to_owned());
    }

    pub fn go_offline(&self) {
        self.unavailable.store(true, Ordering::SeqCst);
    }

    pub fn limit_queries(&self) -> usize {
        self.limit_queries.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn count(&self, action: ActionType) -> u32 {
        let quota = self.quota.lock().expect("quota lock");
        quota.current.get(&action).copied().unwrap_or(0)
    }

    fn ensure_online(&self) -> Result<(), PackageLimitsQueryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PackageLimitsQueryError::connection("connection refused"));
        }
        Ok(())
    }

    fn row(quota: &Quota, action: ActionType) -> Option<PackageLimits> {
        let max_allowed = *quota.max.get(&action)?;
        let current_count = quota.current.get(&action).copied().unwrap_or(0);
        let usage = if max_allowed == 0 {
            100
        } else {
            current_count * 100 / max_allowed
        };
        Some(PackageLimits {
            can_perform_action: current_count < max_allowed,
            current_count,
            max_allowed,
            package_name: quota.package_name.clone(),
            usage_percentage: Some(usage),
            is_at_soft_limit: Some(usage >= SOFT_THRESHOLD_PERCENT),
            error_message: None,
        })
    }
}

#[async_trait]
impl PackageLimitsQuery for QuotaBackend {
    async fn check_package_limits(
        &self,
        _user_id: &UserId,
        action: ActionType,
        mode: LimitCheckMode,
    ) -> Result<Option<PackageLimits>, PackageLimitsQueryError> {
        self.limit_queries.fetch_add(1, Ordering::SeqCst);
        self.ensure_online()?;
        let quota = self.quota.lock().expect("quota lock");
        if let (LimitCheckMode::Hard, Some(message)) = (mode, &quota.refusal) {
            let failure = BackendFailure::new(Some("P0001".to_owned()), message.clone());
            return match failure.classify() {
                BackendFailureKind::LimitExceeded { detail } => {
                    Err(PackageLimitsQueryError::limit_exceeded(detail))
                }
                BackendFailureKind::Other { message } => {
                    Err(PackageLimitsQueryError::rejected(400, message))
                }
            };
        }
        Ok(Self::row(&quota, action))
    }

    async fn get_user_effective_limits(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<EffectiveLimits>, PackageLimitsQueryError> {
        self.ensure_online()?;
        let quota = self.quota.lock().expect("quota lock");
        let max = |action| quota.max.get(&action).copied().unwrap_or(0);
        Ok(Some(EffectiveLimits {
            package_name: quota.package_name.clone(),
            max_clients: max(ActionType::Clients),
            max_pets: max(ActionType::Pets),
            max_services: max(ActionType::Services),
            max_specializations: max(ActionType::Specializations),
            addon_clients: 0,
            addon_pets: 0,
        }))
    }

    async fn get_user_usage_stats(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<UsageStats>, PackageLimitsQueryError> {
        self.ensure_online()?;
        let quota = self.quota.lock().expect("quota lock");
        let current = |action| quota.current.get(&action).copied().unwrap_or(0);
        Ok(Some(UsageStats {
            clients_count: current(ActionType::Clients),
            pets_count: current(ActionType::Pets),
            services_count: current(ActionType::Services),
            specializations_count: current(ActionType::Specializations),
            active_visits_count: 0,
        }))
    }

    async fn get_user_active_subscription(
        &self,
        _user_id: &UserId,
    ) -> Result<Option<ActiveSubscription>, PackageLimitsQueryError> {
        self.ensure_online()?;
        let quota = self.quota.lock().expect("quota lock");
        Ok(Some(ActiveSubscription {
            subscription_id: Uuid::nil(),
            package_id: Uuid::nil(),
            package_name: quota.package_name.clone(),
            status: SubscriptionStatus::Active,
            start_date: Utc
                .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
                .single()
                .expect("valid date"),
            end_date: None,
        }))
    }
}

#[async_trait]
impl<P: NewEntity> CreateEntity<P> for QuotaBackend {
    async fn create(&self, owner: UserId, payload: P) -> Result<P::Record, EntityRepositoryError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let counted = match P::TABLE {
            "clients" => Some(ActionType::Clients),
            "pets" => Some(ActionType::Pets),
            _ => None,
        };
        if let Some(action) = counted {
            let mut quota = self.quota.lock().expect("quota lock");
            *quota.current.entry(action).or_insert(0) += 1;
        }
        Ok(payload.into_record(Uuid::new_v4(), owner, Utc::now()))
    }
}
