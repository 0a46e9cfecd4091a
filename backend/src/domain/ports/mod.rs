//! Domain ports and supporting types for the hexagonal boundary.

mod backend_failure;
mod entity_store;
mod limit_decision_metrics;
mod package_limits_query;

pub use backend_failure::{
    BackendFailure, BackendFailureKind, LEGACY_LIMIT_PREFIX, LIMIT_EXCEEDED_CODE,
};
pub use entity_store::{CreateEntity, EntityRepositoryError, FixtureEntityStore};
#[cfg(test)]
pub use limit_decision_metrics::MockLimitDecisionMetrics;
pub use limit_decision_metrics::{
    LimitDecision, LimitDecisionMetrics, LimitDecisionMetricsError, LimitDecisionOutcome,
    NoOpLimitDecisionMetrics,
};
#[cfg(test)]
pub use package_limits_query::MockPackageLimitsQuery;
pub use package_limits_query::{
    FixturePackageLimitsQuery, PackageLimitsQuery, PackageLimitsQueryError,
};
