//! Read-only quota snapshots computed by the managed backend.
//!
//! Every value here is fetched fresh per call and never persisted or cached
//! by this service; the backend owns the authoritative state.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActionType, SubscriptionStatus};

/// Whether a limit query is informational or enforcing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LimitCheckMode {
    /// Describe the current state; never fail for being at the limit.
    #[default]
    Soft,
    /// Refuse when the action would exceed the limit.
    Hard,
}

impl LimitCheckMode {
    /// Value of the RPC `p_soft_check` argument.
    #[must_use]
    pub const fn is_soft(self) -> bool {
        matches!(self, Self::Soft)
    }
}

/// Result of `check_package_limits` for one user and dimension.
///
/// ## Invariants
/// - Counts are non-negative (enforced by `u32`).
/// - [`PackageLimits::allows_action`] is `false` whenever
///   `current_count >= max_allowed`, whatever the backend reported in
///   `can_perform_action`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLimits {
    /// Backend verdict.
    pub can_perform_action: bool,
    /// Resources of this dimension the user currently holds.
    pub current_count: u32,
    /// Effective maximum (package plus add-ons).
    pub max_allowed: u32,
    /// Name of the user's package.
    pub package_name: String,
    /// Backend-computed usage, in whole percent.
    pub usage_percentage: Option<u32>,
    /// Whether usage crossed the advisory threshold.
    pub is_at_soft_limit: Option<bool>,
    /// Backend-supplied user-facing message.
    pub error_message: Option<String>,
}

impl PackageLimits {
    /// Whether one more resource may be created.
    #[must_use]
    pub fn allows_action(&self) -> bool {
        self.can_perform_action && self.current_count < self.max_allowed
    }

    /// Row with `can_perform_action` cleared once the count reaches the maximum.
    #[must_use]
    pub fn normalised(mut self) -> Self {
        self.can_perform_action = self.allows_action();
        self
    }

    /// Whether usage is within the advisory band.
    #[must_use]
    pub fn is_approaching_limit(&self) -> bool {
        self.is_at_soft_limit.unwrap_or(false)
    }

    /// Usage in whole percent.
    ///
    /// Prefers the backend figure; otherwise derives it from the counts.
    /// A zero maximum reads as fully used.
    #[must_use]
    pub fn usage_percent(&self) -> u32 {
        if let Some(percentage) = self.usage_percentage {
            return percentage;
        }
        if self.max_allowed == 0 {
            return 100;
        }
        let percent = u64::from(self.current_count) * 100 / u64::from(self.max_allowed);
        u32::try_from(percent).unwrap_or(u32::MAX)
    }
}

/// Package maximums with active add-ons already summed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveLimits {
    /// Name of the user's package.
    pub package_name: String,
    /// Client maximum.
    pub max_clients: u32,
    /// Pet maximum.
    pub max_pets: u32,
    /// Service maximum.
    pub max_services: u32,
    /// Specialisation maximum.
    pub max_specializations: u32,
    /// Clients contributed by add-ons.
    pub addon_clients: u32,
    /// Pets contributed by add-ons.
    pub addon_pets: u32,
}

impl EffectiveLimits {
    /// Effective maximum for one dimension.
    #[must_use]
    pub fn limit_for(&self, action: ActionType) -> u32 {
        match action {
            ActionType::Clients => self.max_clients,
            ActionType::Pets => self.max_pets,
            ActionType::Services => self.max_services,
            ActionType::Specializations => self.max_specializations,
        }
    }
}

/// Current resource counts for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageStats {
    /// Clients held.
    pub clients_count: u32,
    /// Pets held.
    pub pets_count: u32,
    /// Services offered.
    pub services_count: u32,
    /// Specialisations declared.
    pub specializations_count: u32,
    /// Visits not yet completed or cancelled.
    pub active_visits_count: u32,
}

impl UsageStats {
    /// Count for one quota dimension.
    #[must_use]
    pub fn count_for(&self, action: ActionType) -> u32 {
        match action {
            ActionType::Clients => self.clients_count,
            ActionType::Pets => self.pets_count,
            ActionType::Services => self.services_count,
            ActionType::Specializations => self.specializations_count,
        }
    }
}

/// The subscription currently granting a user their limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSubscription {
    /// Subscription identifier.
    pub subscription_id: Uuid,
    /// Subscribed package.
    pub package_id: Uuid,
    /// Package display name.
    pub package_name: String,
    /// Subscription state.
    pub status: SubscriptionStatus,
    /// Start of the period.
    pub start_date: DateTime<Utc>,
    /// End of the period; `None` for open-ended plans.
    pub end_date: Option<DateTime<Utc>>,
}

impl ActiveSubscription {
    /// Whole days until `end_date`, clamped at zero. `None` when open-ended.
    #[must_use]
    pub fn days_remaining(&self, clock: &dyn Clock) -> Option<i64> {
        self.end_date
            .map(|end| (end - clock.utc()).num_days().max(0))
    }

    /// Whether the period has ended or the status no longer grants access.
    #[must_use]
    pub fn is_expired(&self, clock: &dyn Clock) -> bool {
        !self.status.grants_access() || self.end_date.is_some_and(|end| end <= clock.utc())
    }
}
