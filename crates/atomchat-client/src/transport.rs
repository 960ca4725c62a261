//! Transport seam between the conversation layer and the HTTP client.

use async_trait::async_trait;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::types::{Answer, ElementLookup, UserRecord};

/// The backend surface the conversation controller drives.
///
/// [`ApiClient`] is the production implementation; tests script this trait
/// directly so conversation flows run without a network.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn current_user(&self) -> Result<UserRecord, ApiError>;
    async fn ask(&self, question: &str) -> Result<Answer, ApiError>;
    async fn element(&self, identifier: &str) -> Result<ElementLookup, ApiError>;
    async fn analyze_media(&self, file_name: &str, bytes: Vec<u8>) -> Result<Answer, ApiError>;
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn current_user(&self) -> Result<UserRecord, ApiError> {
        ApiClient::current_user(self).await
    }

    async fn ask(&self, question: &str) -> Result<Answer, ApiError> {
        ApiClient::ask(self, question).await
    }

    async fn element(&self, identifier: &str) -> Result<ElementLookup, ApiError> {
        ApiClient::element(self, identifier).await
    }

    async fn analyze_media(&self, file_name: &str, bytes: Vec<u8>) -> Result<Answer, ApiError> {
        ApiClient::analyze_media(self, file_name, bytes).await
    }
}
