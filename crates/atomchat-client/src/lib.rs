//! Authenticated HTTP client for the atomchat backend.
//!
//! Every outbound call goes through one [`ApiClient`], which attaches the
//! stored bearer token via a middleware pipeline and centralizes the
//! session-expiry contract: a 401 from any non-auth endpoint clears the
//! session and surfaces a login navigation intent as data.

pub mod client;
pub mod config;
pub mod error;
pub mod middleware;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiClientConfig, DEFAULT_TIMEOUT_MS};
pub use config::{ConfigError, DEFAULT_BASE_URL, ENV_BASE_URL, resolve_base_url};
pub use error::ApiError;
pub use middleware::{MiddlewarePipeline, RequestPurpose};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use transport::ChatBackend;
pub use types::{
    Answer, ELEMENT_NOT_FOUND_HINT, ElementLookup, ElementRecord, Navigation, TokenResponse,
    UserRecord,
};
