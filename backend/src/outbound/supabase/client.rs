//! Thin PostgREST client shared by the Supabase adapters.
//!
//! Owns transport concerns only: endpoint URLs, auth headers, timeouts and
//! mapping HTTP failures into [`RestFailure`]. Backend errors are classified
//! into quota refusals here, once, via [`BackendFailure::classify`].

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use zeroize::Zeroizing;

use super::dto::PostgrestErrorDto;
use crate::domain::ports::{BackendFailure, BackendFailureKind};

const PREFER_REPRESENTATION: &str = "return=representation";

/// Errors raised while building a [`SupabaseClient`].
#[derive(Debug, thiserror::Error)]
pub enum SupabaseClientError {
    /// The project URL cannot serve as a base URL.
    #[error("invalid Supabase URL: {0}")]
    InvalidUrl(String),
    /// The service key contains bytes not allowed in a header.
    #[error("service key is not a valid header value")]
    InvalidKey(#[from] InvalidHeaderValue),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Transport-level failure, before it is mapped onto a port error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum RestFailure {
    /// The backend refused the action for quota reasons.
    LimitExceeded { detail: String },
    /// The request did not complete in time.
    Timeout(String),
    /// The backend could not be reached.
    Connection(String),
    /// The backend answered with a non-success status.
    Rejected { status: u16, message: String },
    /// The response body did not have the expected shape.
    Decode(String),
}

/// Authenticated PostgREST client for one Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    http: Client,
    rest_base: Url,
}

impl SupabaseClient {
    /// Build a client for `project_url` authenticating with `service_key`.
    ///
    /// The key is only kept inside sensitive header values; the caller's
    /// buffer is wiped when it is dropped.
    ///
    /// # Errors
    /// Fails when the URL cannot be a base, the key is not a valid header
    /// value, or the reqwest client cannot be built.
    pub fn new(
        project_url: &Url,
        service_key: Zeroizing<String>,
        timeout: Duration,
    ) -> Result<Self, SupabaseClientError> {
        if project_url.cannot_be_a_base() {
            return Err(SupabaseClientError::InvalidUrl(project_url.to_string()));
        }
        let mut base = project_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_base = base
            .join("rest/v1/")
            .map_err(|err| SupabaseClientError::InvalidUrl(err.to_string()))?;

        let mut api_key = HeaderValue::from_str(service_key.as_str())?;
        api_key.set_sensitive(true);
        let bearer = Zeroizing::new(format!("Bearer {}", service_key.as_str()));
        let mut authorization = HeaderValue::from_str(bearer.as_str())?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, authorization);

        let http = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self { http, rest_base })
    }

    fn endpoint(&self, path: &str) -> Result<Url, RestFailure> {
        self.rest_base
            .join(path)
            .map_err(|err| RestFailure::Connection(format!("invalid endpoint {path}: {err}")))
    }

    /// Call a stored procedure and decode its zero-or-one row result.
    pub(super) async fn rpc<A, R>(&self, function: &str, args: &A) -> Result<Option<R>, RestFailure>
    where
        A: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(&format!("rpc/{function}"))?;
        debug!(function, "calling limits procedure");
        let body = self.post(url, args, false).await?;
        decode_single_row(&body)
    }

    /// Insert one row and return the stored representation.
    pub(super) async fn insert<B, R>(&self, table: &str, row: &B) -> Result<R, RestFailure>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(table)?;
        debug!(table, "inserting row");
        let body = self.post(url, row, true).await?;
        decode_single_row(&body)?
            .ok_or_else(|| RestFailure::Decode(format!("insert into {table} returned no row")))
    }

    async fn post<B>(
        &self,
        url: Url,
        body: &B,
        representation: bool,
    ) -> Result<Vec<u8>, RestFailure>
    where
        B: Serialize + Sync,
    {
        let mut request = self.http.post(url).json(body);
        if representation {
            request = request.header("Prefer", PREFER_REPRESENTATION);
        }
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, &bytes));
        }
        Ok(bytes.to_vec())
    }
}

/// Decode a JSON array holding at most one row.
pub(super) fn decode_single_row<R: DeserializeOwned>(
    body: &[u8],
) -> Result<Option<R>, RestFailure> {
    let mut rows: Vec<R> = serde_json::from_slice(body)
        .map_err(|err| RestFailure::Decode(format!("invalid response payload: {err}")))?;
    match rows.len() {
        0 | 1 => Ok(rows.pop()),
        n => Err(RestFailure::Decode(format!("expected at most one row, got {n}"))),
    }
}

fn map_transport_error(error: reqwest::Error) -> RestFailure {
    if error.is_timeout() {
        RestFailure::Timeout(error.to_string())
    } else if error.is_decode() {
        RestFailure::Decode(error.to_string())
    } else {
        RestFailure::Connection(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> RestFailure {
    let failure = match serde_json::from_slice::<PostgrestErrorDto>(body) {
        Ok(dto) => {
            let message = dto
                .message
                .or(dto.details)
                .unwrap_or_else(|| body_preview(body));
            BackendFailure::new(dto.code, message)
        }
        Err(_) => BackendFailure::new(None, body_preview(body)),
    };
    let message = match failure.classify() {
        BackendFailureKind::LimitExceeded { detail } => {
            return RestFailure::LimitExceeded { detail };
        }
        BackendFailureKind::Other { message } if message.is_empty() => {
            format!("status {}", status.as_u16())
        }
        BackendFailureKind::Other { message } => message,
    };
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => RestFailure::Timeout(message),
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
            RestFailure::Connection(message)
        }
        _ => RestFailure::Rejected {
            status: status.as_u16(),
            message,
        },
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: u32,
    }

    #[rstest]
    #[case(b"[]".as_slice(), None)]
    #[case(br#"[{"id":7}]"#.as_slice(), Some(Row { id: 7 }))]
    fn decodes_zero_or_one_row(#[case] body: &[u8], #[case] expected: Option<Row>) {
        assert_eq!(decode_single_row::<Row>(body), Ok(expected));
    }

    #[rstest]
    fn more_than_one_row_is_a_decode_error() {
        let err = decode_single_row::<Row>(br#"[{"id":1},{"id":2}]"#).expect_err("two rows");
        assert!(matches!(err, RestFailure::Decode(message) if message.contains("got 2")));
    }

    #[rstest]
    #[case(
        r#"{"code":"PL001","message":"Osiągnięto limit klientów"}"#.as_bytes(),
        "Osiągnięto limit klientów"
    )]
    #[case(
        r#"{"code":"P0001","message":"PACKAGE_LIMIT_EXCEEDED: Osiągnięto limit zwierząt"}"#.as_bytes(),
        "Osiągnięto limit zwierząt"
    )]
    fn quota_refusals_are_classified_once(#[case] body: &[u8], #[case] detail: &str) {
        assert_eq!(
            map_status_error(StatusCode::BAD_REQUEST, body),
            RestFailure::LimitExceeded {
                detail: detail.to_owned()
            }
        );
    }

    #[rstest]
    #[case(StatusCode::GATEWAY_TIMEOUT, "timeout")]
    #[case(StatusCode::SERVICE_UNAVAILABLE, "connection")]
    #[case(StatusCode::UNAUTHORIZED, "rejected")]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, "rejected")]
    fn other_statuses_keep_their_category(#[case] status: StatusCode, #[case] expected: &str) {
        let body = br#"{"code":"42501","message":"permission denied"}"#;
        let failure = map_status_error(status, body);
        let kind = match failure {
            RestFailure::Timeout(_) => "timeout",
            RestFailure::Connection(_) => "connection",
            RestFailure::Rejected { .. } => "rejected",
            other => panic!("unexpected failure: {other:?}"),
        };
        assert_eq!(kind, expected);
    }

    #[rstest]
    fn non_json_bodies_are_previewed() {
        let body = format!("<html>{}</html>", "x".repeat(400));
        let failure = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, body.as_bytes());
        let RestFailure::Rejected { status, message } = failure else {
            panic!("expected rejection");
        };
        assert_eq!(status, 500);
        assert!(message.ends_with("..."));
        assert!(message.chars().count() <= 163);
    }

    #[rstest]
    fn rest_base_keeps_project_prefix() {
        let url = Url::parse("https://abc.supabase.co").expect("url");
        let client = SupabaseClient::new(
            &url,
            Zeroizing::new("service-key".to_owned()),
            Duration::from_secs(1),
        )
        .expect("client builds");
        assert_eq!(
            client.endpoint("rpc/check_package_limits").expect("endpoint").as_str(),
            "https://abc.supabase.co/rest/v1/rpc/check_package_limits"
        );
    }
}
