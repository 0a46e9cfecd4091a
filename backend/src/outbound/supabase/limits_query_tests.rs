//! Adapter tests against a local stand-in for the PostgREST endpoints.

use std::net::SocketAddr;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use reqwest::Url;
use rstest::rstest;
use serde_json::{Value, json};
use zeroize::Zeroizing;

use super::*;

const SERVICE_KEY: &str = "test-service-key";

async fn check_package_limits(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
    if req.headers().get("apikey").and_then(|v| v.to_str().ok()) != Some(SERVICE_KEY) {
        return HttpResponse::Unauthorized()
            .json(json!({"code": "PGRST301", "message": "JWT invalid"}));
    }
    match body["p_action_type"].as_str() {
        Some("clients") if body["p_soft_check"] == json!(true) => HttpResponse::Ok().json(json!([{
            "can_perform_action": false,
            "current_count": 30,
            "max_allowed": 30,
            "package_name": "Zaawansowany",
            "usage_percentage": 100,
            "is_at_soft_limit": true,
            "error_message": "Osiągnięto limit klientów",
        }])),
        Some("clients") => HttpResponse::BadRequest().json(json!({
            "code": "P0001",
            "message": "PACKAGE_LIMIT_EXCEEDED: Osiągnięto limit klientów",
        })),
        Some("pets") => HttpResponse::Ok().json(json!([])),
        _ => HttpResponse::Ok().json(json!([{
            "can_perform_action": true,
            "current_count": -3,
            "max_allowed": 10,
            "package_name": "Podstawowy",
        }])),
    }
}

async fn usage_stats() -> HttpResponse {
    HttpResponse::Ok().json(json!([
        {"clients_count": 1, "pets_count": 2, "services_count": 0, "specializations_count": 0},
        {"clients_count": 1, "pets_count": 2, "services_count": 0, "specializations_count": 0},
    ]))
}

fn start_backend() -> (SocketAddr, ServerHandle) {
    let server = HttpServer::new(|| {
        App::new()
            .route(
                "/rest/v1/rpc/check_package_limits",
                web::post().to(check_package_limits),
            )
            .route("/rest/v1/rpc/get_user_usage_stats", web::post().to(usage_stats))
    })
    .workers(1)
    .bind(("127.0.0.1", 0))
    .expect("bind test backend");
    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (addr, handle)
}

fn adapter(addr: SocketAddr, key: &str) -> SupabasePackageLimitsQuery {
    let url = Url::parse(&format!("http://{addr}")).expect("backend url");
    let client = SupabaseClient::new(&url, Zeroizing::new(key.to_owned()), Duration::from_secs(5))
        .expect("client builds");
    SupabasePackageLimitsQuery::new(client)
}

#[rstest]
#[actix_web::test]
async fn soft_check_returns_the_row() {
    let (addr, handle) = start_backend();
    let limits = adapter(addr, SERVICE_KEY)
        .check_package_limits(&UserId::random(), ActionType::Clients, LimitCheckMode::Soft)
        .await
        .expect("soft check succeeds")
        .expect("row present");
    handle.stop(false).await;

    assert!(!limits.allows_action());
    assert_eq!(limits.max_allowed, 30);
    assert_eq!(limits.usage_percentage, Some(100));
}

#[rstest]
#[actix_web::test]
async fn hard_refusal_is_classified_with_prefix_stripped() {
    let (addr, handle) = start_backend();
    let err = adapter(addr, SERVICE_KEY)
        .check_package_limits(&UserId::random(), ActionType::Clients, LimitCheckMode::Hard)
        .await
        .expect_err("hard check refused");
    handle.stop(false).await;

    assert_eq!(
        err,
        PackageLimitsQueryError::limit_exceeded("Osiągnięto limit klientów")
    );
}

#[rstest]
#[actix_web::test]
async fn empty_result_is_none() {
    let (addr, handle) = start_backend();
    let row = adapter(addr, SERVICE_KEY)
        .check_package_limits(&UserId::random(), ActionType::Pets, LimitCheckMode::Soft)
        .await
        .expect("query succeeds");
    handle.stop(false).await;

    assert!(row.is_none());
}

#[rstest]
#[actix_web::test]
async fn malformed_rows_are_decode_errors() {
    let (addr, handle) = start_backend();
    let query = adapter(addr, SERVICE_KEY);
    let malformed = query
        .check_package_limits(&UserId::random(), ActionType::Services, LimitCheckMode::Soft)
        .await
        .expect_err("negative count");
    let duplicated = query
        .get_user_usage_stats(&UserId::random())
        .await
        .expect_err("two rows");
    handle.stop(false).await;

    assert!(matches!(malformed, PackageLimitsQueryError::Decode { .. }));
    assert!(matches!(duplicated, PackageLimitsQueryError::Decode { .. }));
}

#[rstest]
#[actix_web::test]
async fn bad_credentials_are_rejected() {
    let (addr, handle) = start_backend();
    let err = adapter(addr, "wrong-key")
        .check_package_limits(&UserId::random(), ActionType::Clients, LimitCheckMode::Soft)
        .await
        .expect_err("unauthorised");
    handle.stop(false).await;

    assert!(matches!(err, PackageLimitsQueryError::Rejected { status: 401, .. }));
}

#[rstest]
#[actix_web::test]
async fn unreachable_backend_is_a_connection_error() {
    let (addr, handle) = start_backend();
    handle.stop(false).await;

    let err = adapter(addr, SERVICE_KEY)
        .get_user_usage_stats(&UserId::random())
        .await
        .expect_err("server stopped");

    assert!(matches!(err, PackageLimitsQueryError::Connection { .. }));
}
