//! Data layer for the roster console.
//!
//! The pieces fit together like this: [`api`] defines the typed
//! requests and the HTTP client, [`session::SessionStore`] holds the
//! bearer token they authenticate with, [`cache::QueryCache`] serves
//! reads and [`gateway::MutationGateway`] sends writes and invalidates
//! the cache when they succeed. [`state::AppState`] wires all of it up
//! from the config on disk.

pub mod api;
pub mod cache;
pub mod gateway;
pub mod session;
pub mod state;

pub use api::{ApiClient, ApiError, ApiRequest, Mutation, Query, Tag, ValidationError};
pub use cache::{CacheStats, QueryCache, QuerySnapshot, QueryStatus};
pub use gateway::MutationGateway;
pub use session::{Session, SessionStore, SESSION_FILE};
pub use state::{AppConfig, AppState, StateError, CONFIG_FILE, DEFAULT_API_BASE};
