//! HTTP client for the checklist document store.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST /documents` creates a document, answering `{"id": "..."}`
//! - `GET /documents/{id}` returns the document
//! - `PUT /documents/{id}` replaces the whole document

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::remote::{ChecklistDocument, RemoteError};

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

/// HTTP client for the document store.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl DocumentClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional auth header.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::NOT_FOUND => Err(RemoteError::NotFound(body)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RemoteError::Unauthorized),
            _ => Err(RemoteError::Server(format!("{}: {}", status, body))),
        }
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
        Ok(Self::check(response).await?.json().await?)
    }

    /// Create a document and return the key the store generated for it.
    pub async fn create(&self, document: &ChecklistDocument) -> Result<String, RemoteError> {
        let response = self
            .request(reqwest::Method::POST, "/documents")
            .json(document)
            .send()
            .await?;
        let created: Created = Self::json(response).await?;
        Ok(created.id)
    }

    /// Fetch a whole document by key.
    pub async fn fetch(&self, id: &str) -> Result<ChecklistDocument, RemoteError> {
        let response = self
            .request(reqwest::Method::GET, &format!("/documents/{}", id))
            .send()
            .await?;
        Self::json(response).await
    }

    /// Replace a whole document.
    pub async fn replace(&self, id: &str, document: &ChecklistDocument) -> Result<(), RemoteError> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/documents/{}", id))
            .json(document)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
