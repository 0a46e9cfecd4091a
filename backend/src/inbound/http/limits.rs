//! Package limit read endpoints.
//!
//! ```text
//! GET /api/v1/users/{user_id}/limits/{action}
//! GET /api/v1/users/{user_id}/limits/{action}/validate
//! GET /api/v1/users/{user_id}/limits
//! GET /api/v1/users/{user_id}/usage
//! GET /api/v1/users/{user_id}/subscription
//! ```
//!
//! Every read goes straight to the backend; nothing is cached here.

use actix_web::{HttpResponse, get, web};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ActiveSubscription, EffectiveLimits, Error, LimitCheckMode, PackageLimits, UsageStats,
    UserId, ValidationOutcome, ValidationReason,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_action_type, parse_user_id};

const NO_CACHE: (&str, &str) = ("Cache-Control", "private, no-store");

/// Soft-check snapshot for one quota dimension.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackageLimitsResponse {
    pub can_perform_action: bool,
    pub current_count: u32,
    pub max_allowed: u32,
    pub package_name: String,
    pub usage_percentage: u32,
    pub is_at_soft_limit: bool,
    pub error_message: Option<String>,
}

impl From<PackageLimits> for PackageLimitsResponse {
    fn from(value: PackageLimits) -> Self {
        Self {
            can_perform_action: value.allows_action(),
            usage_percentage: value.usage_percent(),
            is_at_soft_limit: value.is_approaching_limit(),
            current_count: value.current_count,
            max_allowed: value.max_allowed,
            package_name: value.package_name,
            error_message: value.error_message,
        }
    }
}

/// Verdict on whether the user may start an action.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcomeResponse {
    pub can_proceed: bool,
    /// One of `limit_exceeded`, `approaching_limit` or `error`.
    #[schema(example = "approaching_limit")]
    pub reason: Option<String>,
    #[schema(example = "83% usage")]
    pub message: Option<String>,
}

fn reason_label(reason: ValidationReason) -> &'static str {
    match reason {
        ValidationReason::LimitExceeded => "limit_exceeded",
        ValidationReason::ApproachingLimit => "approaching_limit",
        ValidationReason::Error => "error",
    }
}

impl From<ValidationOutcome> for ValidationOutcomeResponse {
    fn from(value: ValidationOutcome) -> Self {
        Self {
            can_proceed: value.can_proceed,
            reason: value.reason.map(|reason| reason_label(reason).to_owned()),
            message: value.message,
        }
    }
}

/// Package maximums including add-ons.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveLimitsResponse {
    pub package_name: String,
    pub max_clients: u32,
    pub max_pets: u32,
    pub max_services: u32,
    pub max_specializations: u32,
    pub addon_clients: u32,
    pub addon_pets: u32,
}

impl From<EffectiveLimits> for EffectiveLimitsResponse {
    fn from(value: EffectiveLimits) -> Self {
        Self {
            package_name: value.package_name,
            max_clients: value.max_clients,
            max_pets: value.max_pets,
            max_services: value.max_services,
            max_specializations: value.max_specializations,
            addon_clients: value.addon_clients,
            addon_pets: value.addon_pets,
        }
    }
}

/// Current resource counts.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatsResponse {
    pub clients_count: u32,
    pub pets_count: u32,
    pub services_count: u32,
    pub specializations_count: u32,
    pub active_visits_count: u32,
}

impl From<UsageStats> for UsageStatsResponse {
    fn from(value: UsageStats) -> Self {
        Self {
            clients_count: value.clients_count,
            pets_count: value.pets_count,
            services_count: value.services_count,
            specializations_count: value.specializations_count,
            active_visits_count: value.active_visits_count,
        }
    }
}

/// Active subscription with derived remaining time.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSubscriptionResponse {
    pub subscription_id: String,
    pub package_id: String,
    pub package_name: String,
    #[schema(example = "active")]
    pub status: String,
    pub start_date: String,
    pub end_date: Option<String>,
    /// Whole days left; absent for open-ended plans.
    pub days_remaining: Option<i64>,
    pub is_expired: bool,
}

impl ActiveSubscriptionResponse {
    fn from_domain(value: ActiveSubscription, clock: &dyn Clock) -> Self {
        Self {
            days_remaining: value.days_remaining(clock),
            is_expired: value.is_expired(clock),
            subscription_id: value.subscription_id.to_string(),
            package_id: value.package_id.to_string(),
            package_name: value.package_name,
            status: value.status.as_str().to_owned(),
            start_date: value.start_date.to_rfc3339(),
            end_date: value.end_date.map(|end| end.to_rfc3339()),
        }
    }
}

fn require_row<T>(row: Option<T>, what: &str, user_id: &UserId) -> Result<T, Error> {
    row.ok_or_else(|| Error::not_found(format!("no {what} found for user {user_id}")))
}

/// Soft-check one quota dimension.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/limits/{action}",
    params(
        ("user_id" = String, Path, description = "Specialist identifier"),
        ("action" = String, Path, description = "clients, pets, services or specializations")
    ),
    responses(
        (status = 200, description = "Current usage for the dimension", body = PackageLimitsResponse),
        (status = 400, description = "Invalid user id or action", body = ErrorSchema),
        (status = 404, description = "No active package", body = ErrorSchema),
        (status = 503, description = "Limits backend unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["limits"],
    operation_id = "checkPackageLimits"
)]
#[get("/users/{user_id}/limits/{action}")]
pub async fn check_limits(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_user, raw_action) = path.into_inner();
    let user_id = parse_user_id(&raw_user)?;
    let action = parse_action_type(&raw_action)?;
    let limits = state
        .limits
        .check_package_limits(&user_id, action, LimitCheckMode::Soft)
        .await?;
    let limits = require_row(limits, "package limits", &user_id)?;
    Ok(HttpResponse::Ok()
        .insert_header(NO_CACHE)
        .json(PackageLimitsResponse::from(limits)))
}

/// Decide whether the user may start an action.
///
/// Always 200: failures to verify are reported in the body, with
/// `canProceed` false.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/limits/{action}/validate",
    params(
        ("user_id" = String, Path, description = "Specialist identifier"),
        ("action" = String, Path, description = "clients, pets, services or specializations")
    ),
    responses(
        (status = 200, description = "Validation verdict", body = ValidationOutcomeResponse),
        (status = 400, description = "Invalid user id or action", body = ErrorSchema)
    ),
    tags = ["limits"],
    operation_id = "validateAction"
)]
#[get("/users/{user_id}/limits/{action}/validate")]
pub async fn validate_action(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (raw_user, raw_action) = path.into_inner();
    let user_id = parse_user_id(&raw_user)?;
    let action = parse_action_type(&raw_action)?;
    let outcome = state
        .limits
        .validate_action_before_execution(&user_id, action)
        .await;
    Ok(HttpResponse::Ok()
        .insert_header(NO_CACHE)
        .json(ValidationOutcomeResponse::from(outcome)))
}

/// Effective package maximums.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/limits",
    params(("user_id" = String, Path, description = "Specialist identifier")),
    responses(
        (status = 200, description = "Effective limits", body = EffectiveLimitsResponse),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "No active package", body = ErrorSchema),
        (status = 503, description = "Limits backend unavailable", body = ErrorSchema)
    ),
    tags = ["limits"],
    operation_id = "getEffectiveLimits"
)]
#[get("/users/{user_id}/limits")]
pub async fn effective_limits(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner())?;
    let limits = state.limits.get_user_effective_limits(&user_id).await?;
    let limits = require_row(limits, "effective limits", &user_id)?;
    Ok(HttpResponse::Ok()
        .insert_header(NO_CACHE)
        .json(EffectiveLimitsResponse::from(limits)))
}

/// Current resource counts.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/usage",
    params(("user_id" = String, Path, description = "Specialist identifier")),
    responses(
        (status = 200, description = "Usage statistics", body = UsageStatsResponse),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "No usage statistics", body = ErrorSchema),
        (status = 503, description = "Limits backend unavailable", body = ErrorSchema)
    ),
    tags = ["limits"],
    operation_id = "getUsageStats"
)]
#[get("/users/{user_id}/usage")]
pub async fn usage_stats(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner())?;
    let usage = state.limits.get_user_usage_stats(&user_id).await?;
    let usage = require_row(usage, "usage statistics", &user_id)?;
    Ok(HttpResponse::Ok()
        .insert_header(NO_CACHE)
        .json(UsageStatsResponse::from(usage)))
}

/// Subscription granting the user's limits.
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/subscription",
    params(("user_id" = String, Path, description = "Specialist identifier")),
    responses(
        (status = 200, description = "Active subscription", body = ActiveSubscriptionResponse),
        (status = 400, description = "Invalid user id", body = ErrorSchema),
        (status = 404, description = "No active subscription", body = ErrorSchema),
        (status = 503, description = "Limits backend unavailable", body = ErrorSchema)
    ),
    tags = ["limits"],
    operation_id = "getActiveSubscription"
)]
#[get("/users/{user_id}/subscription")]
pub async fn active_subscription(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let user_id = parse_user_id(&path.into_inner())?;
    let subscription = state.limits.get_user_active_subscription(&user_id).await?;
    let subscription = require_row(subscription, "active subscription", &user_id)?;
    Ok(HttpResponse::Ok()
        .insert_header(NO_CACHE)
        .json(ActiveSubscriptionResponse::from_domain(
            subscription,
            state.clock.as_ref(),
        )))
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod tests;
