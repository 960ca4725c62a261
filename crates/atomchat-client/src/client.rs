//! The typed API client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use reqwest::multipart;
use serde::Serialize;
use uuid::Uuid;

use crate::config::{ConfigError, normalize_base_url};
use crate::error::{ApiError, http_error};
use crate::middleware::{MiddlewarePipeline, RequestPurpose};
use crate::session::SessionStore;
use crate::types::{
    Answer, AskRequest, CredentialsRequest, ELEMENT_NOT_FOUND_HINT, ElementLookup, ElementRecord,
    TokenResponse, UserRecord,
};

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl ApiClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Single choke point for all backend calls.
///
/// Every request passes through the middleware pipeline: the bearer token
/// is attached for non-auth purposes and a 401 from a non-auth endpoint is
/// converted into a session-expired rejection after clearing the store.
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
    session: Arc<dyn SessionStore>,
    pipeline: MiddlewarePipeline,
}

impl ApiClient {
    pub fn new(config: ApiClientConfig, session: Arc<dyn SessionStore>) -> Result<Self, ConfigError> {
        let pipeline = MiddlewarePipeline::standard(Arc::clone(&session));
        Self::with_pipeline(config, session, pipeline)
    }

    /// Constructor taking a custom pipeline; `new` wires the standard one.
    pub fn with_pipeline(
        config: ApiClientConfig,
        session: Arc<dyn SessionStore>,
        pipeline: MiddlewarePipeline,
    ) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(&config.base_url)?;
        Ok(Self {
            base_url,
            timeout: Duration::from_millis(config.timeout_ms.max(250)),
            http: reqwest::Client::new(),
            session,
            pipeline,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.starts_with('/') {
            format!("{}{}", self.base_url, trimmed)
        } else {
            format!("{}/{}", self.base_url, trimmed)
        }
    }

    #[must_use]
    pub fn signup_path() -> &'static str {
        "/signup"
    }

    #[must_use]
    pub fn login_path() -> &'static str {
        "/login"
    }

    #[must_use]
    pub fn me_path() -> &'static str {
        "/me"
    }

    #[must_use]
    pub fn elements_path() -> &'static str {
        "/elements"
    }

    #[must_use]
    pub fn element_path(identifier: &str) -> String {
        format!("/elements/{}", identifier.trim())
    }

    #[must_use]
    pub fn ask_path() -> &'static str {
        "/ask"
    }

    #[must_use]
    pub fn analyze_media_path() -> &'static str {
        "/analyze-media"
    }

    /// Registers a new account. On success the returned token becomes the
    /// stored session.
    pub async fn signup(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.credential_exchange(Self::signup_path(), email, password)
            .await
    }

    /// Exchanges credentials for a session token and stores it.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        self.credential_exchange(Self::login_path(), email, password)
            .await
    }

    async fn credential_exchange(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<TokenResponse, ApiError> {
        let email = require_non_empty("email", email)?;
        let password = require_non_empty("password", password)?;
        let token: TokenResponse = self
            .post_json(
                RequestPurpose::Auth,
                path,
                &CredentialsRequest { email, password },
            )
            .await?;
        self.session.set_token(token.access_token.clone());
        tracing::debug!(path, "session established");
        Ok(token)
    }

    /// The authentication probe: any rejection means no valid session.
    pub async fn current_user(&self) -> Result<UserRecord, ApiError> {
        self.get_json(RequestPurpose::General, Self::me_path()).await
    }

    /// Full element table.
    pub async fn elements(&self) -> Result<Vec<ElementRecord>, ApiError> {
        self.get_json(RequestPurpose::General, Self::elements_path())
            .await
    }

    /// Looks up one element by symbol or name. A 404 is an expected
    /// outcome and comes back as [`ElementLookup::NotFound`].
    pub async fn element(&self, identifier: &str) -> Result<ElementLookup, ApiError> {
        let identifier = require_non_empty("identifier", identifier)?;
        let result: Result<ElementRecord, ApiError> = self
            .get_json(RequestPurpose::General, &Self::element_path(identifier))
            .await;
        match result {
            Ok(record) => Ok(ElementLookup::Found(record)),
            Err(ApiError::Http { status, .. }) if status == StatusCode::NOT_FOUND => {
                Ok(ElementLookup::NotFound {
                    message: ELEMENT_NOT_FOUND_HINT.to_string(),
                })
            }
            Err(error) => Err(error),
        }
    }

    /// Free-text question through the backend's answer service.
    pub async fn ask(&self, question: &str) -> Result<Answer, ApiError> {
        let question = require_non_empty("question", question)?;
        self.post_json(RequestPurpose::General, Self::ask_path(), &AskRequest { question })
            .await
    }

    /// Uploads a binary payload for out-of-band analysis; the response has
    /// the same shape as an `/ask` answer.
    pub async fn analyze_media(&self, file_name: &str, bytes: Vec<u8>) -> Result<Answer, ApiError> {
        let file_name = require_non_empty("file name", file_name)?;
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        self.post_multipart(RequestPurpose::General, Self::analyze_media_path(), form)
            .await
    }

    async fn get_json<T>(&self, purpose: RequestPurpose, path: &str) -> Result<T, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let headers = self.request_headers(purpose)?;
        let request = self
            .http
            .get(self.endpoint(path))
            .headers(headers)
            .timeout(self.timeout);
        self.execute(purpose, request).await
    }

    async fn post_json<Req, Res>(
        &self,
        purpose: RequestPurpose,
        path: &str,
        payload: &Req,
    ) -> Result<Res, ApiError>
    where
        Req: Serialize + ?Sized,
        Res: for<'de> serde::Deserialize<'de>,
    {
        let headers = self.request_headers(purpose)?;
        let request = self
            .http
            .post(self.endpoint(path))
            .headers(headers)
            .timeout(self.timeout)
            .json(payload);
        self.execute(purpose, request).await
    }

    async fn post_multipart<Res>(
        &self,
        purpose: RequestPurpose,
        path: &str,
        form: multipart::Form,
    ) -> Result<Res, ApiError>
    where
        Res: for<'de> serde::Deserialize<'de>,
    {
        let headers = self.request_headers(purpose)?;
        let request = self
            .http
            .post(self.endpoint(path))
            .headers(headers)
            .timeout(self.timeout)
            .multipart(form);
        self.execute(purpose, request).await
    }

    fn request_headers(&self, purpose: RequestPurpose) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Ok(request_id) =
            reqwest::header::HeaderValue::from_str(&format!("req_{}", Uuid::new_v4().simple()))
        {
            headers.insert("x-request-id", request_id);
        }
        self.pipeline.run_before(purpose, &mut headers)?;
        Ok(headers)
    }

    async fn execute<T>(
        &self,
        purpose: RequestPurpose,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let response = request.send().await.map_err(|error| ApiError::Request {
            message: error.to_string(),
        })?;
        // Response hooks may short-circuit (session expiry) before decode.
        self.pipeline.run_after(purpose, response.status())?;
        decode_json_response(response).await
    }
}

fn require_non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::EmptyField { field });
    }
    Ok(trimmed)
}

async fn decode_json_response<T>(response: reqwest::Response) -> Result<T, ApiError>
where
    T: for<'de> serde::Deserialize<'de>,
{
    let status = response.status();
    let bytes = response.bytes().await.map_err(|error| ApiError::Read {
        message: error.to_string(),
    })?;

    if !status.is_success() {
        return Err(http_error(status, &bytes));
    }

    serde_json::from_slice::<T>(&bytes).map_err(|error| ApiError::Decode {
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;

    fn client(base_url: &str) -> ApiClient {
        ApiClient::new(
            ApiClientConfig::new(base_url),
            Arc::new(MemorySessionStore::new()),
        )
        .expect("api client")
    }

    #[test]
    fn endpoint_builder_normalizes_paths() {
        let client = client("https://bot.example.com/");
        assert_eq!(client.base_url(), "https://bot.example.com");
        assert_eq!(client.endpoint("/ask"), "https://bot.example.com/ask");
        assert_eq!(client.endpoint("ask"), "https://bot.example.com/ask");
    }

    #[test]
    fn path_helpers_are_deterministic() {
        assert_eq!(ApiClient::signup_path(), "/signup");
        assert_eq!(ApiClient::login_path(), "/login");
        assert_eq!(ApiClient::me_path(), "/me");
        assert_eq!(ApiClient::elements_path(), "/elements");
        assert_eq!(ApiClient::element_path(" Fe "), "/elements/Fe");
        assert_eq!(ApiClient::ask_path(), "/ask");
        assert_eq!(ApiClient::analyze_media_path(), "/analyze-media");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = ApiClient::new(
            ApiClientConfig::new("   "),
            Arc::new(MemorySessionStore::new()),
        );
        assert_eq!(result.err(), Some(ConfigError::EmptyBaseUrl));
    }

    #[tokio::test]
    async fn empty_inputs_never_reach_the_network() {
        let client = client("https://bot.example.com");

        let ask = client.ask("   ").await;
        assert!(matches!(ask, Err(ApiError::EmptyField { field: "question" })));

        let login = client.login("", "secret").await;
        assert!(matches!(login, Err(ApiError::EmptyField { field: "email" })));

        let password = client.login("user@example.com", " ").await;
        assert!(matches!(
            password,
            Err(ApiError::EmptyField { field: "password" })
        ));

        let lookup = client.element(" ").await;
        assert!(matches!(
            lookup,
            Err(ApiError::EmptyField { field: "identifier" })
        ));

        let upload = client.analyze_media("", Vec::new()).await;
        assert!(matches!(
            upload,
            Err(ApiError::EmptyField { field: "file name" })
        ));
    }
}
