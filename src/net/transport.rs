//! Transport seam between the auth wrapper and the network.
//!
//! SYSTEM CONTEXT
//! ==============
//! `ReqwestTransport` is the production implementation. Its cookie store is
//! the ambient session credential: the backend sets and rotates the cookie and
//! application code never reads it. Tests swap in scripted transports.

use std::time::Duration;

use reqwest::multipart::{Form, Part};

use super::request::{ApiRequest, ApiResponse, Credentials, FormBody, FormValue, RequestBody};
use crate::config::Timeouts;
use crate::error::ApiError;

/// Sends one normalized request and reads the full response.
///
/// Implementations surface every status as `Ok`; only failures that produce
/// no response at all become `Err`.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

pub struct ReqwestTransport {
    /// Client with a cookie jar, used for `Credentials::Include`.
    with_credentials: reqwest::Client,
    /// Jar-less client for `Credentials::Omit`.
    anonymous: reqwest::Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns `ApiError::HttpClientBuild` if either client fails to build.
    pub fn new(timeouts: Timeouts) -> Result<Self, ApiError> {
        let build = |cookies: bool| {
            reqwest::Client::builder()
                .cookie_store(cookies)
                .timeout(Duration::from_secs(timeouts.request_secs))
                .connect_timeout(Duration::from_secs(timeouts.connect_secs))
                .build()
                .map_err(|e| ApiError::HttpClientBuild(e.to_string()))
        };
        Ok(Self { with_credentials: build(true)?, anonymous: build(false)? })
    }

    fn client(&self, credentials: Credentials) -> &reqwest::Client {
        match credentials {
            Credentials::Include => &self.with_credentials,
            Credentials::Omit => &self.anonymous,
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let ApiRequest { method, url, headers, body, credentials } = request;
        tracing::trace!(%method, %url, "sending request");

        let mut builder = self.client(credentials).request(method, &url).headers(headers);
        builder = match body {
            Some(RequestBody::Json(text) | RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Form(form)) => builder.multipart(to_multipart(form)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        Ok(ApiResponse::new(status, headers, body))
    }
}

fn to_multipart(form: FormBody) -> Result<Form, ApiError> {
    let mut multipart = Form::new();
    for (name, value) in form.parts().iter().cloned() {
        multipart = match value {
            FormValue::Text(text) => multipart.text(name, text),
            FormValue::File { file_name, mime, data } => {
                let mut part = Part::bytes(data.to_vec()).file_name(file_name);
                if let Some(mime) = mime {
                    part = part.mime_str(&mime).map_err(|e| ApiError::InvalidHeader(e.to_string()))?;
                }
                multipart.part(name, part)
            }
        };
    }
    Ok(multipart)
}
