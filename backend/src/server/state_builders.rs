//! Builders for HTTP state ports.
//!
//! A configured Supabase client backs both the limits query and the entity
//! stores; without one every port falls back to its fixture.

use std::sync::Arc;

use actix_web::web;
use petsflow::domain::ports::{LimitDecisionMetrics, NoOpLimitDecisionMetrics};
use petsflow::inbound::http::state::{HttpState, HttpStatePorts};
#[cfg(feature = "metrics")]
use petsflow::outbound::metrics::PrometheusLimitDecisionMetrics;
use petsflow::outbound::supabase::{SupabaseEntityStore, SupabasePackageLimitsQuery};
use tracing::warn;

use super::ServerConfig;

#[cfg(feature = "metrics")]
fn build_decision_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn LimitDecisionMetrics>> {
    match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusLimitDecisionMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("limit decision metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpLimitDecisionMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_decision_metrics(
    _config: &ServerConfig,
) -> std::io::Result<Arc<dyn LimitDecisionMetrics>> {
    Ok(Arc::new(NoOpLimitDecisionMetrics))
}

fn build_ports(config: &ServerConfig) -> std::io::Result<HttpStatePorts> {
    let decision_metrics = build_decision_metrics(config)?;
    let Some(client) = &config.supabase else {
        warn!("no Supabase client configured; fixture limits allow every action");
        return Ok(HttpStatePorts {
            decision_metrics,
            ..HttpStatePorts::default()
        });
    };
    let store = Arc::new(SupabaseEntityStore::new(client.clone()));
    Ok(HttpStatePorts {
        limits_query: Arc::new(SupabasePackageLimitsQuery::new(client.clone())),
        decision_metrics,
        clients: store.clone(),
        pets: store.clone(),
        visits: store,
        ..HttpStatePorts::default()
    })
}

/// Build the shared handler state for `config`.
///
/// # Errors
/// Returns [`std::io::Error`] if Prometheus metric registration fails.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    Ok(web::Data::new(HttpState::new(build_ports(config)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use petsflow::domain::{ActionType, LimitCheckMode, UserId};
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn fixture_state_allows_actions() {
        let config = ServerConfig::new("127.0.0.1:0".parse().expect("addr"));
        let state = build_http_state(&config).expect("state");
        let user = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("user id");

        let limits = state
            .limits
            .check_package_limits(&user, ActionType::Clients, LimitCheckMode::Hard)
            .await
            .expect("fixture check");
        assert!(limits.is_some_and(|row| row.allows_action()));
    }
}
