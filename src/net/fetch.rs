//! Authenticated fetch with a one-shot silent token refresh.
//!
//! ARCHITECTURE
//! ============
//! Every session-bound request goes through `AuthFetch::fetch_with_auth`.
//! A 401 triggers at most one `POST` to the refresh endpoint; if that
//! succeeds the original request is replayed exactly once and whatever comes
//! back is returned. The refresh endpoint itself is never retried.
//!
//! TRADE-OFFS
//! ==========
//! By default each failing call refreshes on its own, so simultaneous 401s
//! fire simultaneous refreshes. With coalescing enabled, concurrent callers
//! share one in-flight refresh and its outcome.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures are never swallowed here; they propagate to the caller,
//! including a transport failure of the refresh call itself.

#[cfg(test)]
#[path = "fetch_test.rs"]
mod fetch_test;

use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

use super::request::{ApiRequest, ApiResponse, Credentials, RequestOptions, prepare_request};
use super::transport::Transport;
use crate::error::ApiError;

type RefreshFuture = Shared<BoxFuture<'static, Result<bool, ApiError>>>;

struct InFlight {
    generation: u64,
    future: RefreshFuture,
}

#[derive(Default)]
struct RefreshGate {
    generation: u64,
    in_flight: Option<InFlight>,
}

pub struct AuthFetch {
    transport: Arc<dyn Transport>,
    refresh_url: String,
    coalesce: bool,
    gate: Mutex<RefreshGate>,
}

impl AuthFetch {
    pub fn new(transport: Arc<dyn Transport>, refresh_url: impl Into<String>) -> Self {
        Self { transport, refresh_url: refresh_url.into(), coalesce: false, gate: Mutex::default() }
    }

    /// Share one in-flight refresh among concurrent 401s.
    #[must_use]
    pub fn with_coalesced_refresh(mut self, enabled: bool) -> Self {
        self.coalesce = enabled;
        self
    }

    #[must_use]
    pub fn refresh_url(&self) -> &str {
        &self.refresh_url
    }

    fn is_refresh_url(&self, url: &str) -> bool {
        url == self.refresh_url
    }

    /// Send a request with the session credential, refreshing once on 401.
    ///
    /// Returns the raw response for every status; callers inspect it.
    ///
    /// # Errors
    ///
    /// Returns the transport error of the original request, the refresh
    /// call, or the retry, whichever fails first.
    pub async fn fetch_with_auth(&self, url: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        let request = prepare_request(url, options);
        let response = self.transport.send(request.clone()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || self.is_refresh_url(url) {
            return Ok(response);
        }

        tracing::debug!(%url, "request unauthorized; attempting token refresh");
        if !self.refresh().await? {
            return Ok(response);
        }

        tracing::debug!(%url, "token refreshed; retrying request once");
        self.transport.send(request).await
    }

    /// Send a request with the session credential and no refresh handling.
    ///
    /// Used for the auth endpoints themselves, where a 401 is an answer and
    /// not an expired session.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request produced no response.
    pub async fn fetch_exempt(&self, url: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.transport.send(prepare_request(url, options)).await
    }

    async fn refresh(&self) -> Result<bool, ApiError> {
        if !self.coalesce {
            return refresh_token(Arc::clone(&self.transport), self.refresh_url.clone()).await;
        }

        let (generation, future) = {
            let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
            let joined = gate.in_flight.as_ref().map(|f| (f.generation, f.future.clone()));
            if let Some((generation, future)) = joined {
                tracing::debug!(generation, "joining in-flight token refresh");
                (generation, future)
            } else {
                gate.generation += 1;
                let future = refresh_token(Arc::clone(&self.transport), self.refresh_url.clone())
                    .boxed()
                    .shared();
                gate.in_flight = Some(InFlight { generation: gate.generation, future: future.clone() });
                (gate.generation, future)
            }
        };

        let outcome = future.await;

        let mut gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner);
        if gate.in_flight.as_ref().is_some_and(|f| f.generation == generation) {
            gate.in_flight = None;
        }
        outcome
    }
}

/// `POST` the refresh endpoint with the credential and no body.
async fn refresh_token(transport: Arc<dyn Transport>, url: String) -> Result<bool, ApiError> {
    let request = ApiRequest {
        method: Method::POST,
        url,
        headers: HeaderMap::new(),
        body: None,
        credentials: Credentials::Include,
    };
    let response = transport.send(request).await?;
    if response.ok() {
        Ok(true)
    } else {
        tracing::warn!(status = response.status().as_u16(), "token refresh rejected");
        Ok(false)
    }
}
