//! Supabase implementation of [`CreateEntity`].
//!
//! Inserts go to `POST /rest/v1/<table>` with the owner merged into the
//! payload. A quota trigger on the table may still refuse the row; that
//! surfaces as [`EntityRepositoryError::LimitExceeded`].

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::client::{RestFailure, SupabaseClient};
use crate::domain::ports::{CreateEntity, EntityRepositoryError};
use crate::domain::{NewEntity, UserId};

#[derive(Serialize)]
struct OwnedRow<'a, P> {
    user_id: UserId,
    #[serde(flatten)]
    payload: &'a P,
}

impl From<RestFailure> for EntityRepositoryError {
    fn from(failure: RestFailure) -> Self {
        match failure {
            RestFailure::LimitExceeded { detail } => Self::limit_exceeded(detail),
            RestFailure::Timeout(message) => Self::timeout(message),
            RestFailure::Connection(message) => Self::connection(message),
            RestFailure::Rejected { status, message } => Self::rejected(status, message),
            RestFailure::Decode(message) => Self::decode(message),
        }
    }
}

/// Table writes for clients, pets and visits.
#[derive(Clone)]
pub struct SupabaseEntityStore {
    client: SupabaseClient,
}

impl SupabaseEntityStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<P> CreateEntity<P> for SupabaseEntityStore
where
    P: NewEntity + Serialize,
    P::Record: DeserializeOwned,
{
    async fn create(&self, owner: UserId, payload: P) -> Result<P::Record, EntityRepositoryError> {
        let row = OwnedRow {
            user_id: owner,
            payload: &payload,
        };
        Ok(self.client.insert(P::TABLE, &row).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use actix_web::dev::ServerHandle;
    use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
    use reqwest::Url;
    use rstest::rstest;
    use serde_json::{Value, json};
    use zeroize::Zeroizing;

    use super::*;
    use crate::domain::{NewClient, NewVisit, VisitStatus};

    const OWNER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";

    async fn insert_client(req: HttpRequest, body: web::Json<Value>) -> HttpResponse {
        let prefer = req.headers().get("Prefer").and_then(|v| v.to_str().ok());
        if prefer != Some("return=representation") || body["user_id"] != json!(OWNER) {
            return HttpResponse::BadRequest()
                .json(json!({"code": "22023", "message": "bad insert"}));
        }
        let mut row = body.into_inner();
        row["id"] = json!("00000000-0000-0000-0000-0000000000c1");
        row["created_at"] = json!("2026-03-01T12:00:00.123456+00:00");
        HttpResponse::Created().json(json!([row]))
    }

    async fn insert_visit() -> HttpResponse {
        HttpResponse::BadRequest().json(json!({
            "code": "PL001",
            "message": "  Osiągnięto limit zwierząt  ",
        }))
    }

    fn start_backend() -> (SocketAddr, ServerHandle) {
        let server = HttpServer::new(|| {
            App::new()
                .route("/rest/v1/clients", web::post().to(insert_client))
                .route("/rest/v1/visits", web::post().to(insert_visit))
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

    fn store(addr: SocketAddr) -> SupabaseEntityStore {
        let url = Url::parse(&format!("http://{addr}")).expect("backend url");
        let client = SupabaseClient::new(
            &url,
            Zeroizing::new("service-key".to_owned()),
            Duration::from_secs(5),
        )
        .expect("client builds");
        SupabaseEntityStore::new(client)
    }

    fn owner() -> UserId {
        UserId::new(OWNER).expect("valid owner")
    }

    #[rstest]
    #[actix_web::test]
    async fn insert_returns_the_stored_record() {
        let (addr, handle) = start_backend();
        let client = store(addr)
            .create(
                owner(),
                NewClient {
                    first_name: "Anna".to_owned(),
                    last_name: "Nowak".to_owned(),
                    email: None,
                    phone: Some("+48 600 000 000".to_owned()),
                    address: None,
                    notes: None,
                },
            )
            .await
            .expect("insert succeeds");
        handle.stop(false).await;

        assert_eq!(client.user_id, owner());
        assert_eq!(client.last_name, "Nowak");
        assert_eq!(client.phone.as_deref(), Some("+48 600 000 000"));
    }

    #[rstest]
    #[actix_web::test]
    async fn write_time_refusal_is_classified() {
        let (addr, handle) = start_backend();
        let err = store(addr)
            .create(
                owner(),
                NewVisit {
                    pet_id: uuid::Uuid::nil(),
                    client_id: uuid::Uuid::nil(),
                    visit_date: chrono::Utc::now(),
                    visit_type: "konsultacja".to_owned(),
                    status: VisitStatus::Scheduled,
                    notes: None,
                },
            )
            .await
            .expect_err("quota trigger refuses");
        handle.stop(false).await;

        assert_eq!(
            err,
            EntityRepositoryError::limit_exceeded("Osiągnięto limit zwierząt")
        );
    }
}
