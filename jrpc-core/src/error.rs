//! Error types for jrpc
//!
//! Two error types live here:
//!
//! - **Error**: crate-level errors shared by the server and the client (uses thiserror)
//! - **JsonRpcErrorData**: the `error` member of a JSON-RPC response, as sent on the wire
//!
//! # Reserved Error Codes
//!
//! - `-32700`: Parse error (invalid JSON)
//! - `-32600`: Invalid request (missing or malformed `jsonrpc`/`method`/`id`/`params`)
//! - `-32601`: Method not found (no operation with that name and arity)
//! - `-32602`: Invalid params (arity matched but the argument shape did not)
//! - `-32603`: Internal error
//!
//! Code `0` is used for handler failures that no error mapping claimed. Any
//! other value is application-defined.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{Error, JsonRpcErrorData};
//!
//! let error = Error::MethodNotFound("unknownMethod".into());
//! assert_eq!(error.to_error_data().code, -32601);
//!
//! let wire = JsonRpcErrorData::method_not_found("unknownMethod");
//! assert_eq!(wire.code, jrpc_core::error::METHOD_NOT_FOUND);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// Code used for handler failures without a matching error mapping
pub const UNMAPPED_FAILURE: i32 = 0;

/// Result type for jrpc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type shared by the jrpc crates
///
/// # Error Categories
///
/// - **Protocol errors**: Parse, InvalidRequest, MethodNotFound, InvalidParams,
///   AmbiguousMethod, BatchSizeExceeded
/// - **Remote errors**: JsonRpc (an error object received from a peer), Remote
///   (a failure produced by a custom exception resolver)
/// - **Transport errors**: Io, Http, Timeout, ConnectionClosed, Protocol
/// - **Processing errors**: Serialization, Internal, Handler
///
/// Protocol variants convert to their reserved wire codes via
/// [`Error::to_error_data`].
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// JSON-RPC error object, either received from a peer or produced by a
    /// handler that wants to control the exact error sent back
    #[error("JSON-RPC error: {0}")]
    JsonRpc(#[from] JsonRpcErrorData),

    /// Input was not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// A streamed document grew past the reader's size limit before it ended
    #[error("Document exceeds {limit} bytes")]
    DocumentTooLarge {
        /// The maximum accepted document size in bytes
        limit: usize,
    },

    /// Serialization or deserialization between Rust types and JSON failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input/output error from the underlying stream or socket
    #[error("IO error: {0}")]
    Io(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(String),

    /// The JSON value is not a valid request object
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No registered operation has that name and a compatible arity
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Operations with a compatible arity exist, but the arguments do not bind
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// Several operations match a positional call equally well
    #[error("Ambiguous method: {method} has {candidates} operations accepting {arity} arguments")]
    AmbiguousMethod {
        /// Requested method name
        method: String,
        /// Number of supplied arguments
        arity: usize,
        /// Number of equally good candidates
        candidates: usize,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// A handler failed and the server is configured to re-raise failures
    #[error("Handler for {method} failed: {message}")]
    Handler {
        /// Method whose handler failed
        method: String,
        /// The failure's message
        message: String,
    },

    /// The peer's response is not a usable JSON-RPC response
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A failure reconstructed from an error response by a custom exception resolver
    #[error("Remote failure: {0}")]
    Remote(Arc<dyn std::error::Error + Send + Sync>),

    /// Request operation timeout
    #[error("Request timeout")]
    Timeout,

    /// Connection was closed before a response arrived
    #[error("Connection closed")]
    ConnectionClosed,

    /// Batch request size exceeded the configured limit
    #[error("Batch size limit exceeded: limit={limit}, actual={actual}")]
    BatchSizeExceeded {
        /// The maximum allowed batch size
        limit: usize,
        /// The actual batch size that was rejected
        actual: usize,
    },
}

impl Error {
    /// Map this error onto the wire error object the server sends back
    ///
    /// `JsonRpc` is passed through unchanged. Protocol variants get their
    /// reserved code. Everything else becomes an internal error.
    pub fn to_error_data(&self) -> JsonRpcErrorData {
        match self {
            Error::JsonRpc(data) => data.clone(),
            Error::Parse(_) | Error::DocumentTooLarge { .. } => JsonRpcErrorData::parse_error(),
            Error::InvalidRequest(msg) => JsonRpcErrorData::invalid_request(msg.clone()),
            Error::MethodNotFound(method) => JsonRpcErrorData::method_not_found(method.clone()),
            Error::InvalidParams(msg) => JsonRpcErrorData::invalid_params(msg.clone()),
            Error::AmbiguousMethod { .. } => JsonRpcErrorData::invalid_params(self.to_string()),
            Error::BatchSizeExceeded { limit, actual } => {
                JsonRpcErrorData::batch_size_exceeded(*limit, *actual)
            }
            other => JsonRpcErrorData::internal_error(other.to_string()),
        }
    }

    /// The remote error code, when this error came from an error response
    pub fn code(&self) -> Option<i32> {
        match self {
            Error::JsonRpc(data) => Some(data.code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

/// The `error` member of a JSON-RPC response
///
/// # Examples
///
/// ```rust
/// use jrpc_core::JsonRpcErrorData;
/// use serde_json::json;
///
/// let error = JsonRpcErrorData::method_not_found("calculate");
/// assert_eq!(error.code, -32601);
///
/// let custom = JsonRpcErrorData::with_data(
///     1001,
///     "Insufficient funds",
///     json!({"balance": 50, "required": 100})
/// );
/// assert!(custom.data.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorData {
    /// Numeric error code
    pub code: i32,

    /// Short description of the error
    pub message: String,

    /// Optional additional error information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Create an error with code and message
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with additional data
    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Parse error (-32700): the input was not valid JSON
    pub fn parse_error() -> Self {
        Self::new(PARSE_ERROR, "Parse error")
    }

    /// Invalid request error (-32600): valid JSON, but not a request object
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::new(INVALID_REQUEST, msg)
    }

    /// Method not found error (-32601)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use jrpc_core::JsonRpcErrorData;
    ///
    /// let error = JsonRpcErrorData::method_not_found("calculateFoo");
    /// assert_eq!(error.message, "Method not found: calculateFoo");
    /// ```
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method.into()))
    }

    /// Invalid params error (-32602)
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::new(INVALID_PARAMS, msg)
    }

    /// Internal error (-32603)
    pub fn internal_error(msg: impl Into<String>) -> Self {
        Self::new(INTERNAL_ERROR, msg)
    }

    /// Batch size exceeded (-32600)
    ///
    /// Sent as a single response when a batch holds more elements than the
    /// server's configured limit.
    pub fn batch_size_exceeded(limit: usize, actual: usize) -> Self {
        Self::new(
            INVALID_REQUEST,
            format!("Batch size {} exceeds limit {}", actual, limit),
        )
    }

    /// Convert into a JSON tree, omitting `data` when absent
    pub fn into_value(self) -> Value {
        let mut object = Map::new();
        object.insert("code".to_string(), Value::from(self.code));
        object.insert("message".to_string(), Value::String(self.message));
        if let Some(data) = self.data {
            object.insert("data".to_string(), data);
        }
        Value::Object(object)
    }

    /// Read an error object received from a peer
    ///
    /// # Errors
    ///
    /// `Error::Protocol` unless `value` is an object with an integer `code`
    /// that fits in `i32` and a string `message`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            Error::Protocol(format!("error member is not an object: {}", value))
        })?;
        let code = object
            .get("code")
            .and_then(Value::as_i64)
            .and_then(|c| i32::try_from(c).ok())
            .ok_or_else(|| Error::Protocol(format!("error member has no valid code: {}", value)))?;
        let message = object
            .get("message")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::Protocol(format!("error member has no valid message: {}", value))
            })?
            .to_string();
        let data = object.get("data").filter(|d| !d.is_null()).cloned();
        Ok(Self { code, message, data })
    }
}

impl fmt::Display for JsonRpcErrorData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorData {}
