//! Interceptor pipeline for outbound requests.
//!
//! Hooks run in registration order. A pre-request hook shapes the outgoing
//! header map; a post-response hook inspects the status and may reject the
//! chain, short-circuiting the call before the body is decoded. The
//! standard pipeline carries exactly two hooks: bearer-token attachment and
//! the session-expiry watch.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::error::ApiError;
use crate::session::SessionStore;
use crate::types::Navigation;

/// Call-site tag deciding which cross-cutting rules apply to a request.
///
/// Keyed here instead of on URL strings so the auth exemption cannot break
/// silently when endpoint paths change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPurpose {
    /// Credential exchange (`/login`, `/signup`): precedes session
    /// existence, never carries a token, and a 401 is a credential
    /// rejection rather than an expiry.
    Auth,
    /// Any call made under an established session.
    General,
}

pub trait RequestHook: Send + Sync {
    fn before_request(
        &self,
        purpose: RequestPurpose,
        headers: &mut HeaderMap,
    ) -> Result<(), ApiError>;
}

pub trait ResponseHook: Send + Sync {
    fn after_response(&self, purpose: RequestPurpose, status: StatusCode) -> Result<(), ApiError>;
}

/// Ordered interceptor chain applied to every request the client sends.
#[derive(Default)]
pub struct MiddlewarePipeline {
    request_hooks: Vec<Box<dyn RequestHook>>,
    response_hooks: Vec<Box<dyn ResponseHook>>,
}

impl MiddlewarePipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The pipeline every [`crate::ApiClient`] starts with: bearer
    /// attachment plus the expiry watch, both over the same store.
    #[must_use]
    pub fn standard(store: Arc<dyn SessionStore>) -> Self {
        Self::new()
            .with_request_hook(BearerAuth::new(Arc::clone(&store)))
            .with_response_hook(ExpiryWatch::new(store))
    }

    #[must_use]
    pub fn with_request_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.request_hooks.push(Box::new(hook));
        self
    }

    #[must_use]
    pub fn with_response_hook(mut self, hook: impl ResponseHook + 'static) -> Self {
        self.response_hooks.push(Box::new(hook));
        self
    }

    /// Runs pre-request hooks in order; the first rejection wins.
    pub fn run_before(
        &self,
        purpose: RequestPurpose,
        headers: &mut HeaderMap,
    ) -> Result<(), ApiError> {
        for hook in &self.request_hooks {
            hook.before_request(purpose, headers)?;
        }
        Ok(())
    }

    /// Runs post-response hooks in order; the first rejection wins.
    pub fn run_after(&self, purpose: RequestPurpose, status: StatusCode) -> Result<(), ApiError> {
        for hook in &self.response_hooks {
            hook.after_response(purpose, status)?;
        }
        Ok(())
    }
}

/// Attaches `Authorization: Bearer <token>` to every non-auth request with
/// a stored token. Auth requests are exempt even when a stale token exists.
pub struct BearerAuth {
    store: Arc<dyn SessionStore>,
}

impl BearerAuth {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl RequestHook for BearerAuth {
    fn before_request(
        &self,
        purpose: RequestPurpose,
        headers: &mut HeaderMap,
    ) -> Result<(), ApiError> {
        if purpose == RequestPurpose::Auth {
            return Ok(());
        }
        if let Some(token) = self.store.token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|error| {
                ApiError::Request {
                    message: format!("stored token is not a valid header value: {error}"),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(())
    }
}

/// Treats a 401 from any non-auth endpoint as session expiry: clears the
/// stored token and rejects with the login navigation intent. A 401 from a
/// login/signup attempt passes through untouched, so the call meant to
/// establish a session can never trip the invalidation path.
pub struct ExpiryWatch {
    store: Arc<dyn SessionStore>,
}

impl ExpiryWatch {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl ResponseHook for ExpiryWatch {
    fn after_response(&self, purpose: RequestPurpose, status: StatusCode) -> Result<(), ApiError> {
        if status == StatusCode::UNAUTHORIZED && purpose != RequestPurpose::Auth {
            self.store.clear();
            tracing::warn!("session expired, stored token cleared");
            return Err(ApiError::SessionExpired {
                redirect: Navigation::Login,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn store_with_token(token: &str) -> Arc<MemorySessionStore> {
        let store = Arc::new(MemorySessionStore::new());
        store.set_token(token.to_string());
        store
    }

    #[test]
    fn bearer_attached_for_general_requests_with_token() {
        let store = store_with_token("tok_123");
        let pipeline = MiddlewarePipeline::standard(store);

        let mut headers = HeaderMap::new();
        pipeline
            .run_before(RequestPurpose::General, &mut headers)
            .expect("pipeline accepts");
        assert_eq!(
            headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer tok_123")
        );
    }

    #[test]
    fn bearer_never_attached_for_auth_requests_even_with_stale_token() {
        let store = store_with_token("tok_stale");
        let pipeline = MiddlewarePipeline::standard(store);

        let mut headers = HeaderMap::new();
        pipeline
            .run_before(RequestPurpose::Auth, &mut headers)
            .expect("pipeline accepts");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn no_bearer_without_token() {
        let pipeline = MiddlewarePipeline::standard(Arc::new(MemorySessionStore::new()));

        let mut headers = HeaderMap::new();
        pipeline
            .run_before(RequestPurpose::General, &mut headers)
            .expect("pipeline accepts");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn unauthorized_general_response_clears_token_and_redirects() {
        let store = store_with_token("tok_expired");
        let pipeline = MiddlewarePipeline::standard(Arc::clone(&store) as Arc<dyn SessionStore>);

        let result = pipeline.run_after(RequestPurpose::General, StatusCode::UNAUTHORIZED);
        match result {
            Err(ApiError::SessionExpired { redirect }) => assert_eq!(redirect, Navigation::Login),
            other => panic!("expected session expiry, got {other:?}"),
        }
        assert_eq!(store.token(), None);
    }

    #[test]
    fn unauthorized_auth_response_keeps_token_and_passes_through() {
        let store = store_with_token("tok_kept");
        let pipeline = MiddlewarePipeline::standard(Arc::clone(&store) as Arc<dyn SessionStore>);

        pipeline
            .run_after(RequestPurpose::Auth, StatusCode::UNAUTHORIZED)
            .expect("credential rejection is not an expiry");
        assert_eq!(store.token(), Some("tok_kept".to_string()));
    }

    #[test]
    fn success_statuses_pass_through() {
        let store = store_with_token("tok_ok");
        let pipeline = MiddlewarePipeline::standard(Arc::clone(&store) as Arc<dyn SessionStore>);

        pipeline
            .run_after(RequestPurpose::General, StatusCode::OK)
            .expect("success passes");
        pipeline
            .run_after(RequestPurpose::General, StatusCode::NOT_FOUND)
            .expect("non-401 failures are left to the caller");
        assert_eq!(store.token(), Some("tok_ok".to_string()));
    }

    #[test]
    fn hooks_run_in_registration_order_and_short_circuit() {
        struct Tag(&'static str);
        impl RequestHook for Tag {
            fn before_request(
                &self,
                _purpose: RequestPurpose,
                headers: &mut HeaderMap,
            ) -> Result<(), ApiError> {
                if headers.contains_key("x-tag") {
                    return Err(ApiError::Request {
                        message: format!("{} saw an earlier tag", self.0),
                    });
                }
                headers.insert("x-tag", HeaderValue::from_static("first"));
                Ok(())
            }
        }

        let pipeline = MiddlewarePipeline::new()
            .with_request_hook(Tag("first"))
            .with_request_hook(Tag("second"));

        let mut headers = HeaderMap::new();
        let error = pipeline
            .run_before(RequestPurpose::General, &mut headers)
            .expect_err("second hook rejects");
        assert!(error.to_string().contains("second"));
    }
}
