//! Read access to the hosted database: client construction, queries, and the typed fetch seam.

mod client;
mod fetch;
mod query;

pub use client::{BackendClient, build_http_client};
pub use fetch::RestaurantSource;
pub use query::{Direction, OrderBy, TableQuery};

/// Shown wherever a view needs the backend but no client handle could be built.
pub const MISSING_CONFIG_ADVISORY: &str = "Supabase env variables not found. Ensure SUPABASE_URL and SUPABASE_ANON_KEY are set and restart the server.";

/// Body excerpt length kept in logs for failed requests.
pub(crate) const BODY_PREVIEW_CHARS: usize = 300;
