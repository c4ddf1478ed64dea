//! Query Module
//!
//! Async fetch-and-cache wrapper built on a shared [`AdvancedCache`].
//!
//! [`AdvancedCache`]: crate::cache::AdvancedCache

mod cached;
mod client;
mod options;
mod state;

pub use cached::CachedQuery;
pub use client::QueryClient;
pub use options::{
    QueryClientConfig, QueryOptions, DEFAULT_CACHE_TIME_MS, DEFAULT_QUERY_PERSISTENCE_KEY,
};
pub use state::{QueryState, QueryStatus};
