//! OpenAPI documentation for the limits API.
//!
//! Registers the limit read endpoints, the guarded creation endpoints and the
//! health checks. Response DTOs referenced from the paths are collected
//! automatically; the error wrappers are listed explicitly because the domain
//! types do not derive `ToSchema`.
//!
//! Served by Swagger UI in debug builds and printed by the `openapi-dump`
//! binary.

use utoipa::OpenApi;

use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "PetsFlow package limits API",
        description = "Package quota queries and limit-guarded creation of clients, pets, visits."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::limits::check_limits,
        crate::inbound::http::limits::validate_action,
        crate::inbound::http::limits::effective_limits,
        crate::inbound::http::limits::usage_stats,
        crate::inbound::http::limits::active_subscription,
        crate::inbound::http::entities::create_client,
        crate::inbound::http::entities::create_pet,
        crate::inbound::http::entities::create_visit,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "limits", description = "Package limit queries"),
        (name = "entities", description = "Limit-guarded resource creation"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    fn error_schema_is_registered_with_trace_id() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[rstest]
    #[case("/api/v1/users/{user_id}/limits/{action}")]
    #[case("/api/v1/users/{user_id}/limits/{action}/validate")]
    #[case("/api/v1/users/{user_id}/clients")]
    #[case("/api/v1/users/{user_id}/visits")]
    #[case("/health/ready")]
    fn documents_every_route(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn create_client_documents_limit_refusal() {
        let doc = ApiDoc::openapi();
        let item = doc
            .paths
            .paths
            .get("/api/v1/users/{user_id}/clients")
            .expect("clients path");
        let operation = item.post.as_ref().expect("post operation");
        assert!(operation.responses.responses.contains_key("403"));
    }
}
