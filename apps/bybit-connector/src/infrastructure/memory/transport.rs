//! Scripted in-memory transport.
//!
//! Replays queued venue responses per endpoint and records every call, so
//! the connector can be driven end-to-end without a network.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::application::ports::{CallOptions, Endpoint, RequestParams, TransportError, TransportPort};

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Endpoint called.
    pub endpoint: Endpoint,
    /// Parameters sent.
    pub params: RequestParams,
    /// Call options.
    pub options: CallOptions,
}

/// Transport that answers from per-endpoint queues.
///
/// An endpoint with an empty queue answers with a network error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<HashMap<Endpoint, VecDeque<Result<String, TransportError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    /// Create a transport with nothing queued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response body.
    pub fn push_body(&self, endpoint: Endpoint, body: impl Into<String>) -> &Self {
        self.enqueue(endpoint, Ok(body.into()))
    }

    /// Queue a successful envelope around `result`.
    pub fn push_ok(&self, endpoint: Endpoint, result: Value) -> &Self {
        let body = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": result,
            "time": 1_700_000_000_000_i64,
        });
        self.push_body(endpoint, body.to_string())
    }

    /// Queue an envelope with a non-zero `retCode`.
    pub fn push_ret_code(&self, endpoint: Endpoint, ret_code: i64, ret_msg: &str) -> &Self {
        let body = json!({
            "retCode": ret_code,
            "retMsg": ret_msg,
            "result": {},
            "time": 1_700_000_000_000_i64,
        });
        self.push_body(endpoint, body.to_string())
    }

    /// Queue a transport failure.
    pub fn push_error(&self, endpoint: Endpoint, error: TransportError) -> &Self {
        self.enqueue(endpoint, Err(error))
    }

    fn enqueue(&self, endpoint: Endpoint, response: Result<String, TransportError>) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(endpoint)
            .or_default()
            .push_back(response);
        self
    }

    /// Every call so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls made to one endpoint, in order.
    #[must_use]
    pub fn calls_to(&self, endpoint: Endpoint) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.endpoint == endpoint)
            .collect()
    }

    /// Responses still queued for an endpoint.
    #[must_use]
    pub fn pending(&self, endpoint: Endpoint) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&endpoint)
            .map_or(0, VecDeque::len)
    }
}

#[async_trait]
impl TransportPort for ScriptedTransport {
    async fn call(
        &self,
        endpoint: Endpoint,
        params: &RequestParams,
        options: CallOptions,
    ) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                endpoint,
                params: params.clone(),
                options,
            });

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::Network {
                    message: format!("no scripted response for {endpoint}"),
                })
            })
    }
}
