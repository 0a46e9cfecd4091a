//! Supabase (PostgREST) adapters for the limit query and entity ports.

mod client;
mod dto;
mod entity_store;
mod limits_query;

pub use client::{SupabaseClient, SupabaseClientError};
pub use entity_store::SupabaseEntityStore;
pub use limits_query::SupabasePackageLimitsQuery;
