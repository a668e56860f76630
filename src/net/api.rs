//! REST helpers for talking to the booking backend.
//!
//! Every verb helper resolves its path against the configured base URL and
//! routes through `AuthFetch`, so admin screens never bypass the refresh
//! handling. Non-2xx responses come back as `Ok`; callers inspect the status.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;

use super::fetch::AuthFetch;
use super::request::{ApiResponse, FormBody, RequestBody, RequestOptions};
use super::transport::{ReqwestTransport, Transport};
use crate::config::{AdminConfig, TOKEN_REFRESH_PATH};
use crate::error::ApiError;

pub struct ApiClient {
    base_url: String,
    fetch: AuthFetch,
}

impl ApiClient {
    /// Build a client over the production reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &AdminConfig) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client over an arbitrary transport.
    pub fn with_transport(config: &AdminConfig, transport: Arc<dyn Transport>) -> Self {
        let base_url = config.base_url.clone();
        let fetch = AuthFetch::new(transport, format!("{base_url}{TOKEN_REFRESH_PATH}"))
            .with_coalesced_refresh(config.coalesce_refresh);
        Self { base_url, fetch }
    }

    /// Base URL followed by `path`. The path must carry its leading `/`.
    #[must_use]
    pub fn build_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn fetch(&self) -> &AuthFetch {
        &self.fetch
    }

    /// Send arbitrary options to `path` through the refresh wrapper.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.fetch.fetch_with_auth(&self.build_url(path), options).await
    }

    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::new(Method::GET)).await
    }

    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized or no response was received.
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<ApiResponse, ApiError> {
        self.send_json(Method::POST, path, payload).await
    }

    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized or no response was received.
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<ApiResponse, ApiError> {
        self.send_json(Method::PUT, path, payload).await
    }

    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized or no response was received.
    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, payload: &T) -> Result<ApiResponse, ApiError> {
        self.send_json(Method::PATCH, path, payload).await
    }

    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::new(Method::DELETE)).await
    }

    /// Upload a multipart form, e.g. a venue photo.
    ///
    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn post_form(&self, path: &str, form: FormBody) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::new(Method::POST).body(RequestBody::Form(form))).await
    }

    /// # Errors
    ///
    /// Returns a transport error if no response was received.
    pub async fn put_form(&self, path: &str, form: FormBody) -> Result<ApiResponse, ApiError> {
        self.request(path, RequestOptions::new(Method::PUT).body(RequestBody::Form(form))).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
    ) -> Result<ApiResponse, ApiError> {
        let body = RequestBody::json(payload)?;
        self.request(path, RequestOptions::new(method).body(body)).await
    }
}
