//! HTTP inbound adapter exposing REST endpoints.

pub mod entities;
pub mod error;
pub mod health;
pub mod limits;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod validation;

pub use error::ApiResult;

use actix_web::web;

/// Register the limit and entity handlers on a `/api/v1` scope.
///
/// The validate route is registered before the bare limit route so the
/// longer path is matched first.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(limits::validate_action)
        .service(limits::check_limits)
        .service(limits::effective_limits)
        .service(limits::usage_stats)
        .service(limits::active_subscription)
        .service(entities::create_client)
        .service(entities::create_pet)
        .service(entities::create_visit);
}
