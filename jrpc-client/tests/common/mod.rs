//! Common test utilities for jrpc-client integration tests
//!
//! `MockTransport` stands in for a server: it records every document the
//! client sends and answers calls through a handler closure.

#![allow(dead_code)]

use async_trait::async_trait;
use jrpc_client::Transport;
use jrpc_core::Result;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// In-memory transport driven by a response closure
#[derive(Clone)]
pub struct MockTransport {
    responder: Arc<Responder>,
    sent: Arc<Mutex<Vec<Value>>>,
}

impl MockTransport {
    /// Answer every call through `responder`
    pub fn with_handler<F>(responder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(Box::new(responder)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer every call with `result`, echoing the request id
    pub fn returning(result: Value) -> Self {
        Self::with_handler(move |request| Ok(mock_response(&request["id"], result.clone())))
    }

    /// Answer every call with the given document unchanged
    pub fn replying(response: Value) -> Self {
        Self::with_handler(move |_| Ok(response.clone()))
    }

    /// Every document sent so far, calls and notifications alike
    pub fn sent(&self) -> Vec<Value> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_sent(&self) -> Value {
        self.sent().last().cloned().unwrap_or(Value::Null)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(&self, request: &Value) -> Result<Value> {
        self.sent.lock().unwrap().push(request.clone());
        (self.responder)(request)
    }

    async fn send(&self, notification: &Value) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Success response for `id`
pub fn mock_response(id: &Value, result: Value) -> Value {
    json!({"jsonrpc": "2.0", "result": result, "id": id})
}

/// Error response for `id`
pub fn mock_error_response(id: &Value, code: i32, message: &str) -> Value {
    json!({"jsonrpc": "2.0", "error": {"code": code, "message": message}, "id": id})
}
