//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and only ever see domain services
//! built over ports, so they stay testable without I/O.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};

use crate::domain::ports::{
    CreateEntity, FixtureEntityStore, FixturePackageLimitsQuery, LimitDecisionMetrics,
    NoOpLimitDecisionMetrics, PackageLimitsQuery,
};
use crate::domain::{EntityServicesWithLimits, NewClient, NewPet, NewVisit, PackageLimitsService};

/// Parameter object bundling the port implementations.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub limits_query: Arc<dyn PackageLimitsQuery>,
    pub decision_metrics: Arc<dyn LimitDecisionMetrics>,
    pub clients: Arc<dyn CreateEntity<NewClient>>,
    pub pets: Arc<dyn CreateEntity<NewPet>>,
    pub visits: Arc<dyn CreateEntity<NewVisit>>,
    pub clock: Arc<dyn Clock>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        let store = Arc::new(FixtureEntityStore);
        Self {
            limits_query: Arc::new(FixturePackageLimitsQuery),
            decision_metrics: Arc::new(NoOpLimitDecisionMetrics),
            clients: store.clone(),
            pets: store.clone(),
            visits: store,
            clock: Arc::new(DefaultClock),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub limits: PackageLimitsService,
    pub entities: Arc<EntityServicesWithLimits>,
    pub clock: Arc<dyn Clock>,
}

impl HttpState {
    /// Build the services over the given ports.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            limits_query,
            decision_metrics,
            clients,
            pets,
            visits,
            clock,
        } = ports;
        let limits = PackageLimitsService::with_metrics(limits_query, decision_metrics);
        let entities = EntityServicesWithLimits::new(limits.clone(), clients, pets, visits);
        Self {
            limits,
            entities: Arc::new(entities),
            clock,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}
