//! JSON-RPC client
//!
//! [`JrpcClient`] builds request documents, hands them to a [`Transport`] and
//! interprets the single response that comes back.
//!
//! # Round Trip
//!
//! 1. **Build**: fresh string id, params serialized from the caller's value
//! 2. **Listen**: request listeners see (and may edit) the document
//! 3. **Send**: the transport delivers it and returns one response document
//! 4. **Listen**: listeners see the response document
//! 5. **Interpret**: a non-object is a protocol error; a non-null `error` goes
//!    through the exception resolver; otherwise `result` (absent means `null`)
//!    is deserialized into the caller's type
//!
//! # Cloning
//!
//! `JrpcClient` is cheap to clone; clones share the transport, resolver,
//! listeners and metrics.

use crate::exception::{DefaultExceptionResolver, ExceptionResolver};
use crate::listener::RequestListener;
use crate::metrics::ClientMetrics;
use crate::request;
use crate::transport::Transport;
use crate::ClientBuilder;
use jrpc_core::{Error, Id, JsonRpcErrorData, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// JSON-RPC 2.0 client over a pluggable transport
#[derive(Clone)]
pub struct JrpcClient {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) exception_resolver: Arc<dyn ExceptionResolver>,
    pub(crate) listeners: Arc<[Arc<dyn RequestListener>]>,
    pub(crate) metrics: Option<Arc<ClientMetrics>>,
}

impl JrpcClient {
    /// Start configuring a client for `url`
    ///
    /// `http://` and `https://` URLs use HTTP POST, `tcp://host:port` uses a
    /// raw socket.
    pub fn builder(url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(url)
    }

    /// Create a client with default settings over the given transport
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            exception_resolver: Arc::new(DefaultExceptionResolver),
            listeners: Arc::from(Vec::new()),
            metrics: None,
        }
    }

    /// Call `method` and wait for its result
    ///
    /// `params` may be a tuple or array (positional arguments), a map or
    /// struct (named arguments), a single scalar (one positional argument) or
    /// `()` for no arguments.
    ///
    /// # Errors
    ///
    /// - Transport failures (`Io`, `Http`, `Timeout`, `ConnectionClosed`)
    /// - `Protocol` when the response is not a JSON object
    /// - Whatever the exception resolver returns for an error response
    ///   (`JsonRpc` by default)
    /// - `Serialization` when the result does not fit `R`
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use jrpc_client::JrpcClient;
    ///
    /// # async fn example(client: JrpcClient) -> jrpc_core::Result<()> {
    /// let sum: i64 = client.invoke("add", (5, 3)).await?;
    /// assert_eq!(sum, 8);
    /// # Ok(())
    /// # }
    /// ```
    #[tracing::instrument(skip_all, fields(method = %method))]
    pub async fn invoke<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let start = Instant::now();
        let outcome = self.round_trip(method, params).await;
        let duration = start.elapsed().as_secs_f64();

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                if let Some(ref m) = self.metrics {
                    m.record_request(method, "error", duration);
                    m.record_error(error_kind(&e));
                }
                tracing::debug!(error = %e, duration_secs = duration, "Call failed");
                return Err(e);
            }
        };

        if let Some(ref m) = self.metrics {
            m.record_request(method, "success", duration);
        }
        tracing::debug!(duration_secs = duration, "Call completed");

        serde_json::from_value(result).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Send a notification; no response is read
    #[tracing::instrument(skip_all, fields(method = %method))]
    pub async fn notify<P>(&self, method: &str, params: P) -> Result<()>
    where
        P: Serialize,
    {
        let mut notification = request::build_notification(method, params)?;
        for listener in self.listeners.iter() {
            listener.on_before_request(&mut notification);
        }

        self.transport.send(&notification).await?;

        if let Some(ref m) = self.metrics {
            m.record_notification(method);
        }
        Ok(())
    }

    async fn round_trip<P: Serialize>(&self, method: &str, params: P) -> Result<Value> {
        let id = request::next_id();
        let mut request = request::build_request(method, params, id.clone())?;
        for listener in self.listeners.iter() {
            listener.on_before_request(&mut request);
        }

        let mut response = self.transport.call(&request).await?;
        for listener in self.listeners.iter() {
            listener.on_before_response(&mut response);
        }

        self.read_response(&id, response)
    }

    /// Interpret one response document
    fn read_response(&self, id: &Id, response: Value) -> Result<Value> {
        let mut response = match response {
            Value::Object(object) => object,
            other => {
                return Err(Error::Protocol(format!(
                    "Invalid JSON-RPC response: expected an object, got {}",
                    other
                )))
            }
        };

        match Id::from_member(response.get("id")) {
            Ok(Some(ref received)) if received == id => {}
            received => {
                tracing::warn!(expected = %id, received = ?received, "Response id does not match request");
            }
        }

        if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
            let error = JsonRpcErrorData::from_value(error)?;
            tracing::debug!(code = error.code, message = %error.message, "Error response");
            return Err(self.exception_resolver.resolve_exception(&error));
        }

        Ok(response.remove("result").unwrap_or(Value::Null))
    }
}

fn error_kind(error: &Error) -> &'static str {
    match error {
        Error::JsonRpc(_) | Error::Remote(_) => "json_rpc",
        Error::Protocol(_) | Error::Parse(_) => "protocol",
        Error::Timeout => "timeout",
        Error::Serialization(_) => "serialization",
        _ => "transport",
    }
}
