//! Package limit enforcement for the PetsFlow practice backend.
//!
//! The [`domain`] holds the limit policy and the creation guards; adapters
//! in [`inbound`] and [`outbound`] connect it to HTTP and to the managed
//! backend.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
