//! Request/response descriptors passed across the transport seam.
//!
//! DESIGN
//! ======
//! A request is fully described by owned, cloneable data so the retry
//! wrapper can reissue the exact original after a token refresh. That is why
//! multipart bodies are held as `FormBody` instead of `reqwest::multipart::Form`.

#[cfg(test)]
#[path = "request_test.rs"]
mod request_test;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Whether the ambient session credential (cookie jar) accompanies a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Credentials {
    #[default]
    Include,
    Omit,
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { file_name: String, mime: Option<String>, data: Bytes },
}

/// Multipart form payload. The transport supplies the boundary header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBody {
    parts: Vec<(String, FormValue)>,
}

impl FormBody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), FormValue::Text(value.into())));
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push((
            name.into(),
            FormValue::File { file_name: file_name.into(), mime: mime.map(str::to_owned), data: data.into() },
        ));
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[(String, FormValue)] {
        &self.parts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// Already-serialized JSON text.
    Json(String),
    Text(String),
    Form(FormBody),
}

impl RequestBody {
    /// Serialize `payload` into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Serialize` if the payload cannot be encoded.
    pub fn json<T: Serialize + ?Sized>(payload: &T) -> Result<Self, ApiError> {
        serde_json::to_string(payload)
            .map(Self::Json)
            .map_err(|e| ApiError::Serialize(e.to_string()))
    }

    #[must_use]
    pub fn is_form(&self) -> bool {
        matches!(self, Self::Form(_))
    }
}

/// Caller-facing options for a single call; `Default` is a bare GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self { method, ..Self::default() }
    }

    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

/// Final, normalized request handed to a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub credentials: Credentials,
}

/// Merge caller options with the credential directive and default headers.
///
/// Non-form requests without an explicit content type are sent as JSON.
/// Form requests never get a JSON content type forced onto them.
#[must_use]
pub fn prepare_request(url: &str, options: RequestOptions) -> ApiRequest {
    let RequestOptions { method, mut headers, body } = options;
    let is_form = body.as_ref().is_some_and(RequestBody::is_form);
    if !is_form && !headers.contains_key(CONTENT_TYPE) {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }
    ApiRequest { method, url: url.to_owned(), headers, body, credentials: Credentials::Include }
}

/// A fully-read backend response. Non-2xx statuses are not errors here.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// An empty-bodied response with the given status.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self::new(status, HeaderMap::new(), Bytes::new())
    }

    /// A JSON response with the given status.
    #[must_use]
    pub fn with_json(status: StatusCode, value: &serde_json::Value) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        Self::new(status, headers, value.to_string())
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body is not UTF-8.
    pub fn text(&self) -> Result<String, ApiError> {
        String::from_utf8(self.body.to_vec()).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
