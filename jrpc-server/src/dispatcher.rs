//! Request dispatch
//!
//! [`JrpcServer`] turns one JSON-RPC document into zero or one response
//! document. It validates each request, resolves the method against its
//! registry, runs the chosen handler, and maps failures to error objects.
//! It does not own a socket; the stream server and the HTTP binding feed it
//! documents, and `handle` serves a single document from any async stream.
//!
//! # Responses
//!
//! - Malformed JSON: a parse error with a null id
//! - Anything that is not a request object (or a batch of them), a wrong
//!   `jsonrpc` version, a missing or empty `method`, an unreadable `id` or
//!   scalar `params`: an invalid-request error, sent even for notifications
//! - Notifications (absent or `null` id): no response, even when they fail
//! - Batches: one response per non-notification element, in order; nothing
//!   at all when every element is a notification
//!
//! # Examples
//!
//! ```rust
//! use jrpc_server::{from_typed_fn, Failure, JrpcServer, Operation};
//! use serde_json::json;
//!
//! # async fn example() -> jrpc_core::Result<()> {
//! let server = JrpcServer::builder()
//!     .operation(
//!         Operation::builder("add")
//!             .param::<i64>("a")
//!             .param::<i64>("b")
//!             .handler(from_typed_fn(|(a, b): (i64, i64)| async move {
//!                 Ok::<_, Failure>(a + b)
//!             })),
//!     )
//!     .build()?;
//!
//! let response = server
//!     .handle_value(json!({"jsonrpc": "2.0", "method": "add", "params": [5, 3], "id": 1}))
//!     .await;
//! assert_eq!(response, Some(json!({"jsonrpc": "2.0", "result": 8, "id": 1})));
//! # Ok(())
//! # }
//! ```

use crate::batch;
use crate::builder::ServerBuilder;
use crate::config::ServerConfig;
use crate::error_resolver::ErrorResolverChain;
use crate::metrics::ServerMetrics;
use crate::registry::MethodRegistry;
use crate::resolver;
use jrpc_core::{
    codec, Error, Id, JsonRpcErrorData, JsonRpcResponse, Params, Result, JSONRPC_VERSION,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncWrite};

/// JSON-RPC dispatcher for one handler surface
///
/// Cheap to clone; clones share the registry, configuration and metrics, so
/// one server can answer requests from many tasks at once.
#[derive(Clone)]
pub struct JrpcServer {
    registry: Arc<MethodRegistry>,
    config: ServerConfig,
    error_resolver: Arc<ErrorResolverChain>,
    metrics: Option<Arc<ServerMetrics>>,
}

/// Outcome of dispatching one document
pub(crate) struct Dispatch {
    pub(crate) response: Option<Value>,
    /// First handler failure, kept for re-raising
    pub(crate) failure: Option<Error>,
}

impl Dispatch {
    pub(crate) fn reply(response: JsonRpcResponse) -> Self {
        Self {
            response: Some(response.into_value()),
            failure: None,
        }
    }
}

/// Outcome of processing one request object
pub(crate) struct RequestOutcome {
    pub(crate) response: Option<JsonRpcResponse>,
    pub(crate) failure: Option<Error>,
}

impl RequestOutcome {
    pub(crate) fn reply(response: JsonRpcResponse) -> Self {
        Self {
            response: Some(response),
            failure: None,
        }
    }
}

enum Invocation {
    Success(Value),
    /// The request never reached a handler
    Rejected(JsonRpcErrorData),
    Failed {
        error: JsonRpcErrorData,
        failure: Error,
    },
}

impl JrpcServer {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub(crate) fn from_parts(
        registry: MethodRegistry,
        config: ServerConfig,
        error_resolver: ErrorResolverChain,
        metrics: Option<Arc<ServerMetrics>>,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            error_resolver: Arc::new(error_resolver),
            metrics,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &MethodRegistry {
        &self.registry
    }

    pub(crate) fn metrics(&self) -> Option<&Arc<ServerMetrics>> {
        self.metrics.as_ref()
    }

    /// Dispatch a parsed document and return the response document, if any
    ///
    /// There is no stream to fail here, so `rethrow_failures` only adds an
    /// error-level log for the failure next to the mapped error response.
    pub async fn handle_value(&self, message: Value) -> Option<Value> {
        let dispatch = self.dispatch(message).await;
        if let Some(failure) = &dispatch.failure {
            if self.config.rethrow_failures {
                tracing::error!(
                    error = %failure,
                    "Handler failure not re-raised outside a stream; sent as an error response"
                );
            }
        }
        dispatch.response
    }

    /// Dispatch raw bytes; malformed JSON yields a parse-error response
    ///
    /// Input longer than `max_document_size` is answered with a parse error
    /// without being parsed.
    pub async fn handle_bytes(&self, input: &[u8]) -> Option<String> {
        if let Some(limit) = self.config.max_document_size {
            if input.len() > limit {
                tracing::warn!(bytes = input.len(), limit, "Request document too large");
                return Some(parse_error_response().to_string());
            }
        }

        match codec::decode(input) {
            Ok(message) => self
                .handle_value(message)
                .await
                .map(|response| response.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed request document");
                Some(parse_error_response().to_string())
            }
        }
    }

    pub async fn handle_str(&self, input: &str) -> Option<String> {
        self.handle_bytes(input.as_bytes()).await
    }

    /// Read one document from `reader` and write its response to `writer`
    ///
    /// Nothing is written for notifications or an empty stream. Malformed
    /// input is answered with a parse error.
    ///
    /// # Errors
    ///
    /// I/O failures on either stream. When `rethrow_failures` is set, a
    /// handler failure is returned as `Error::Handler` after its error
    /// response has been written.
    pub async fn handle<R, W>(&self, reader: &mut R, writer: &mut W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        self.handle_next(reader, writer, &mut buf).await.map(|_| ())
    }

    /// Serve the next document of a stream
    ///
    /// Returns `Ok(false)` once the stream should be closed: on end of input
    /// or after answering malformed or oversized input, since framing is lost.
    pub(crate) async fn handle_next<R, W>(
        &self,
        reader: &mut R,
        writer: &mut W,
        buf: &mut Vec<u8>,
    ) -> Result<bool>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let limit = self.config.max_document_size.unwrap_or(usize::MAX);
        let message = match codec::read_document_limited(reader, buf, limit).await {
            Ok(Some(message)) => message,
            Ok(None) => return Ok(false),
            Err(e @ (Error::Parse(_) | Error::DocumentTooLarge { .. })) => {
                tracing::warn!(error = %e, "Malformed request document");
                codec::write_document(writer, &parse_error_response()).await?;
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let dispatch = self.dispatch(message).await;
        if let Some(response) = &dispatch.response {
            codec::write_document(writer, response).await?;
        }

        match dispatch.failure {
            Some(failure) if self.config.rethrow_failures => Err(failure),
            _ => Ok(true),
        }
    }

    #[tracing::instrument(skip(self, message), name = "jrpc.dispatch")]
    pub(crate) async fn dispatch(&self, message: Value) -> Dispatch {
        match message {
            Value::Object(request) => {
                let outcome = self.process_request(request).await;
                Dispatch {
                    response: outcome.response.map(JsonRpcResponse::into_value),
                    failure: outcome.failure,
                }
            }
            Value::Array(items) => batch::process_batch(self, items).await,
            other => {
                tracing::warn!(kind = json_kind(&other), "Request is not an object or array");
                self.record_error(jrpc_core::error::INVALID_REQUEST);
                Dispatch::reply(JsonRpcResponse::error(
                    JsonRpcErrorData::invalid_request("Request must be an object or an array"),
                    Id::Null,
                ))
            }
        }
    }

    /// Validate, resolve and run one request object
    pub(crate) async fn process_request(&self, request: Map<String, Value>) -> RequestOutcome {
        let id = match Id::from_member(request.get("id")) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid request id");
                return self.reject(e, None);
            }
        };

        let (method, params) = match validate(&request) {
            Ok(parts) => parts,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid request");
                return self.reject(e, id);
            }
        };

        let start = Instant::now();
        let (response, failure) = match self.invoke(&method, params.as_ref()).await {
            Invocation::Success(result) => (JsonRpcResponse::success(result, id.clone()), None),
            Invocation::Rejected(error) => (JsonRpcResponse::error(error, id.clone()), None),
            Invocation::Failed { error, failure } => {
                (JsonRpcResponse::error(error, id.clone()), Some(failure))
            }
        };

        if let Some(m) = &self.metrics {
            let status = if response.is_success() { "success" } else { "error" };
            m.record_request(&method, status, start.elapsed().as_secs_f64());
            if let Some(error) = &response.error {
                m.record_error(error.code);
            }
        }

        if id.is_none() {
            tracing::debug!(method = %method, "Notification processed");
            return RequestOutcome {
                response: None,
                failure,
            };
        }

        RequestOutcome {
            response: Some(response),
            failure,
        }
    }

    fn reject(&self, error: Error, id: Option<Id>) -> RequestOutcome {
        let data = error.to_error_data();
        self.record_error(data.code);
        RequestOutcome::reply(JsonRpcResponse::error(data, id))
    }

    fn record_error(&self, code: i32) {
        if let Some(m) = &self.metrics {
            m.record_error(code);
        }
    }

    async fn invoke(&self, method: &str, params: Option<&Params>) -> Invocation {
        let candidates = self.registry.lookup(method);
        let call = match resolver::resolve(method, &candidates, params, &self.config) {
            Ok(call) => call,
            Err(e) => {
                tracing::debug!(method = %method, error = %e, "No operation accepts the request");
                return Invocation::Rejected(e.to_error_data());
            }
        };

        tracing::debug!(
            method = %method,
            operation = %call.operation.signature(),
            "Invoking operation"
        );

        match call.operation.handler().call(call.args).await {
            Ok(result) => Invocation::Success(result),
            Err(failure) => {
                let error = self.error_resolver.resolve(&failure, &call.operation);
                tracing::error!(
                    method = %method,
                    failure_type = failure.type_name(),
                    code = error.code,
                    error = %failure,
                    "Operation failed"
                );
                Invocation::Failed {
                    error,
                    failure: Error::Handler {
                        method: method.to_string(),
                        message: failure.message(),
                    },
                }
            }
        }
    }
}

/// Check the envelope of a request object and extract method and params
fn validate(request: &Map<String, Value>) -> Result<(String, Option<Params>)> {
    match request.get("jsonrpc") {
        Some(Value::String(version)) if version == JSONRPC_VERSION => {}
        Some(other) => {
            return Err(Error::InvalidRequest(format!(
                "Unsupported jsonrpc version: {}",
                other
            )))
        }
        None => return Err(Error::InvalidRequest("Missing jsonrpc member".to_string())),
    }

    let method = match request.get("method") {
        Some(Value::String(method)) if !method.is_empty() => method.clone(),
        Some(_) => {
            return Err(Error::InvalidRequest(
                "method must be a non-empty string".to_string(),
            ))
        }
        None => return Err(Error::InvalidRequest("Missing method member".to_string())),
    };

    let params = Params::from_member(request.get("params"))?;
    Ok((method, params))
}

pub(crate) fn parse_error_response() -> Value {
    JsonRpcResponse::error(JsonRpcErrorData::parse_error(), Id::Null).into_value()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Failure;
    use crate::handler::{from_fn, from_typed_fn};
    use crate::operation::Operation;
    use serde_json::json;

    fn server() -> JrpcServer {
        JrpcServer::builder()
            .operation(
                Operation::builder("echo")
                    .param::<Value>("value")
                    .handler(from_fn(|args: Vec<Value>| async move {
                        Ok::<_, Failure>(args.into_iter().next().unwrap_or_default())
                    })),
            )
            .operation(Operation::builder("fail").handler(from_typed_fn(|(): ()| async {
                Err::<(), _>(Failure::msg("broken"))
            })))
            .build()
            .unwrap()
    }

    #[test]
    fn test_validate() {
        let ok = json!({"jsonrpc": "2.0", "method": "m", "params": [1]});
        let (method, params) = validate(ok.as_object().unwrap()).unwrap();
        assert_eq!(method, "m");
        assert_eq!(params.map(|p| p.len()), Some(1));

        for bad in [
            json!({"method": "m"}),
            json!({"jsonrpc": "1.0", "method": "m"}),
            json!({"jsonrpc": "2.0"}),
            json!({"jsonrpc": "2.0", "method": ""}),
            json!({"jsonrpc": "2.0", "method": 5}),
            json!({"jsonrpc": "2.0", "method": "m", "params": 3}),
        ] {
            let err = validate(bad.as_object().unwrap()).unwrap_err();
            assert!(matches!(err, Error::InvalidRequest(_)), "{}", bad);
        }
    }

    #[tokio::test]
    async fn test_numeric_id_echoed() {
        let response = server()
            .handle_value(json!({"jsonrpc": "2.0", "method": "echo", "params": ["x"], "id": 9}))
            .await
            .unwrap();
        assert_eq!(response, json!({"jsonrpc": "2.0", "result": "x", "id": 9}));
    }

    #[tokio::test]
    async fn test_null_result_is_serialized() {
        let response = server()
            .handle_value(json!({"jsonrpc": "2.0", "method": "echo", "params": [null], "id": "1"}))
            .await
            .unwrap();
        assert_eq!(response["result"], Value::Null);
        assert!(response.as_object().unwrap().contains_key("result"));
    }

    #[tokio::test]
    async fn test_bad_id_rejected_with_null_id() {
        let response = server()
            .handle_value(json!({"jsonrpc": "2.0", "method": "echo", "params": [1], "id": {}}))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32600);
        assert_eq!(response["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_scalar_document_rejected() {
        let response = server().handle_value(json!(42)).await.unwrap();
        assert_eq!(response["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_failed_notification_is_silent() {
        let dispatch = server()
            .dispatch(json!({"jsonrpc": "2.0", "method": "fail"}))
            .await;
        assert!(dispatch.response.is_none());
        assert!(matches!(dispatch.failure, Some(Error::Handler { .. })));
    }

    #[tokio::test]
    async fn test_handle_bytes_parse_error() {
        let response = server().handle_str("{\"jsonrpc\": ").await.unwrap();
        let response: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["id"], Value::Null);
    }
}
