//! Subscription reference data: packages, subscriptions and add-ons.
//!
//! These records are owned by the managed backend and edited by
//! administrators. The service reads them; it never writes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ActionType, UserId};

/// Subscription tier definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Package identifier.
    pub id: Uuid,
    /// Display name, e.g. "Zaawansowany".
    pub name: String,
    /// Monthly price in minor currency units.
    pub price_cents: i64,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Base client maximum.
    pub max_clients: u32,
    /// Base pet maximum.
    pub max_pets: u32,
    /// Base service maximum.
    pub max_services: u32,
    /// Base specialisation maximum.
    pub max_specializations: u32,
    /// Whether subscribers are featured in the landing page carousel.
    pub can_access_carousel: bool,
    /// Whether subscribers are listed in the public specialist catalogue.
    pub can_appear_in_catalog: bool,
    /// Whether the package can currently be purchased.
    pub is_active: bool,
}

impl Package {
    /// Base maximum for one dimension, before add-ons.
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

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Free trial period.
    Trial,
    /// Paid and current.
    Active,
    /// Past its end date.
    Expired,
    /// Cancelled by the user or by billing.
    Cancelled,
}

impl SubscriptionStatus {
    /// Whether the status grants package limits at all.
    #[must_use]
    pub const fn grants_access(self) -> bool {
        matches!(self, Self::Trial | Self::Active)
    }

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trial => "trial",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Binding of a user to a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSubscription {
    /// Subscription identifier.
    pub id: Uuid,
    /// Subscribed user.
    pub user_id: UserId,
    /// Subscribed package.
    pub package_id: Uuid,
    /// Current state.
    pub status: SubscriptionStatus,
    /// Start of the subscription period.
    pub start_date: DateTime<Utc>,
    /// End of the subscription period; `None` for open-ended plans.
    pub end_date: Option<DateTime<Utc>>,
    /// Payment provider reference.
    pub payment_reference: Option<String>,
}

/// Dimension an add-on extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonType {
    /// Extra clients.
    Clients,
    /// Extra pets.
    Pets,
}

impl AddonType {
    /// The quota dimension this add-on raises.
    #[must_use]
    pub const fn action_type(self) -> ActionType {
        match self {
            Self::Clients => ActionType::Clients,
            Self::Pets => ActionType::Pets,
        }
    }
}

/// Purchasable limit extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    /// Add-on identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Extended dimension.
    pub addon_type: AddonType,
    /// Amount added to the package maximum.
    pub limit_increase: u32,
    /// Price in minor currency units.
    pub price_cents: i64,
    /// Whether the add-on can currently be purchased.
    pub is_active: bool,
}

/// Add-on purchased by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAddon {
    /// Purchase identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// The purchased add-on.
    pub addon: Addon,
    /// Current state.
    pub status: SubscriptionStatus,
    /// Purchase time.
    pub purchased_at: DateTime<Utc>,
    /// Expiry, when the add-on is time boxed.
    pub expires_at: Option<DateTime<Utc>>,
}

impl UserAddon {
    /// Whether the add-on counts towards effective limits at `now`.
    #[must_use]
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.status.grants_access() && self.expires_at.is_none_or(|expiry| expiry > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::{fixture, rstest};

    #[fixture]
    fn pets_addon() -> UserAddon {
        UserAddon {
            id: Uuid::new_v4(),
            user_id: UserId::random(),
            addon: Addon {
                id: Uuid::new_v4(),
                name: "Pakiet +10 zwierząt".to_owned(),
                addon_type: AddonType::Pets,
                limit_increase: 10,
                price_cents: 1_900,
                is_active: true,
            },
            status: SubscriptionStatus::Active,
            purchased_at: Utc::now() - Duration::days(3),
            expires_at: None,
        }
    }

    #[rstest]
    fn open_ended_active_addon_is_effective(pets_addon: UserAddon) {
        assert!(pets_addon.is_effective_at(Utc::now()));
        assert_eq!(pets_addon.addon.addon_type.action_type(), ActionType::Pets);
    }

    #[rstest]
    fn expired_addon_is_not_effective(mut pets_addon: UserAddon) {
        let now = Utc::now();
        pets_addon.expires_at = Some(now - Duration::seconds(1));
        assert!(!pets_addon.is_effective_at(now));
    }

    #[rstest]
    #[case(SubscriptionStatus::Trial, true)]
    #[case(SubscriptionStatus::Active, true)]
    #[case(SubscriptionStatus::Expired, false)]
    #[case(SubscriptionStatus::Cancelled, false)]
    fn access_follows_status(#[case] status: SubscriptionStatus, #[case] expected: bool) {
        assert_eq!(status.grants_access(), expected);
    }
}
