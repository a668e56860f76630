//! Scripted transport for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use super::request::{ApiRequest, ApiResponse};
use super::transport::Transport;
use crate::error::ApiError;

pub(crate) enum Reply {
    Respond(ApiResponse),
    Fail(ApiError),
    Delayed(Duration, ApiResponse),
}

impl Reply {
    pub(crate) fn status(status: StatusCode) -> Self {
        Self::Respond(ApiResponse::empty(status))
    }

    pub(crate) fn json(status: StatusCode, value: Value) -> Self {
        Self::Respond(ApiResponse::with_json(status, &value))
    }

    pub(crate) fn network_error() -> Self {
        Self::Fail(ApiError::Transport("connection refused".into()))
    }
}

/// Replies are queued per URL and consumed in order. An exhausted queue
/// answers 404 so unexpected calls show up in assertions.
#[derive(Default)]
pub(crate) struct MockTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(&self, url: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(url.to_owned())
            .or_default()
            .push_back(reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|r| r.url == url).count()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&request.url)
            .and_then(VecDeque::pop_front);
        self.calls.lock().unwrap().push(request);
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Delayed(delay, response)) => {
                tokio::time::sleep(delay).await;
                Ok(response)
            }
            None => Ok(ApiResponse::empty(StatusCode::NOT_FOUND)),
        }
    }
}
