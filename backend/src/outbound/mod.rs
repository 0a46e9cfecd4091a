//! Outbound adapters implementing domain ports.
//!
//! - **supabase**: PostgREST client for the limit procedures and table inserts
//! - **metrics**: Prometheus exporters (feature-gated)
//!
//! Adapters translate between wire rows and domain types; they hold no policy.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod supabase;
