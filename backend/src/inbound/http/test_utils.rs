//! Shared helpers for HTTP handler tests.

use std::sync::Arc;

use actix_web::{App, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::MockClock;

use crate::domain::PackageLimits;
use crate::domain::ports::PackageLimitsQuery;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

pub(crate) const USER_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(crate) fn fixed_clock() -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now());
    clock
}

pub(crate) fn limits_row(can: bool, current: u32, max: u32) -> PackageLimits {
    PackageLimits {
        can_perform_action: can,
        current_count: current,
        max_allowed: max,
        package_name: "Zaawansowany".to_owned(),
        usage_percentage: None,
        is_at_soft_limit: None,
        error_message: None,
    }
}

/// Fixture ports with the given limits query and a fixed clock.
pub(crate) fn ports_with_query(query: impl PackageLimitsQuery + 'static) -> HttpStatePorts {
    HttpStatePorts {
        limits_query: Arc::new(query),
        clock: Arc::new(fixed_clock()),
        ..HttpStatePorts::default()
    }
}

/// App exposing every API handler under `/api/v1`.
pub(crate) fn test_app(
    ports: HttpStatePorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(HttpState::new(ports)))
        .service(web::scope("/api/v1").configure(crate::inbound::http::configure_api))
}
