//! Limit-guarded create services for each quota-counted entity.
//!
//! Visits have no quota dimension of their own and are gated on pets.

use std::sync::Arc;

use crate::domain::ports::CreateEntity;
use crate::domain::{ActionType, LimitGuard, NewClient, NewPet, NewVisit, PackageLimitsService};

/// Guard client creation with the `clients` quota.
pub fn client_service_with_limits<C>(
    limits: PackageLimitsService,
    store: C,
) -> LimitGuard<NewClient, C>
where
    C: CreateEntity<NewClient>,
{
    LimitGuard::new(limits, store, ActionType::Clients)
}

/// Guard pet creation with the `pets` quota.
pub fn pet_service_with_limits<C>(limits: PackageLimitsService, store: C) -> LimitGuard<NewPet, C>
where
    C: CreateEntity<NewPet>,
{
    LimitGuard::new(limits, store, ActionType::Pets)
}

/// Guard visit creation with the `pets` quota.
pub fn visit_service_with_limits<C>(
    limits: PackageLimitsService,
    store: C,
) -> LimitGuard<NewVisit, C>
where
    C: CreateEntity<NewVisit>,
{
    LimitGuard::new(limits, store, ActionType::Pets)
}

/// Guarded client store behind a trait object.
pub type DynClientService = LimitGuard<NewClient, Arc<dyn CreateEntity<NewClient>>>;
/// Guarded pet store behind a trait object.
pub type DynPetService = LimitGuard<NewPet, Arc<dyn CreateEntity<NewPet>>>;
/// Guarded visit store behind a trait object.
pub type DynVisitService = LimitGuard<NewVisit, Arc<dyn CreateEntity<NewVisit>>>;

/// The three guarded create services, sharing one limits service.
pub struct EntityServicesWithLimits {
    /// Client creation.
    pub clients: DynClientService,
    /// Pet creation.
    pub pets: DynPetService,
    /// Visit creation.
    pub visits: DynVisitService,
}

impl EntityServicesWithLimits {
    /// Wrap the given stores.
    pub fn new(
        limits: PackageLimitsService,
        clients: Arc<dyn CreateEntity<NewClient>>,
        pets: Arc<dyn CreateEntity<NewPet>>,
        visits: Arc<dyn CreateEntity<NewVisit>>,
    ) -> Self {
        Self {
            clients: client_service_with_limits(limits.clone(), clients),
            pets: pet_service_with_limits(limits.clone(), pets),
            visits: visit_service_with_limits(limits, visits),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureEntityStore, FixturePackageLimitsQuery};
    use rstest::rstest;

    #[rstest]
    fn visits_are_gated_on_pets() {
        let limits = PackageLimitsService::new(Arc::new(FixturePackageLimitsQuery));
        let store = Arc::new(FixtureEntityStore);
        let services = EntityServicesWithLimits::new(limits, store.clone(), store.clone(), store);

        assert_eq!(services.clients.action(), ActionType::Clients);
        assert_eq!(services.pets.action(), ActionType::Pets);
        assert_eq!(services.visits.action(), ActionType::Pets);
    }
}
