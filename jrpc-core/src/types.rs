//! JSON-RPC 2.0 wire types
//!
//! This module holds the data structures that travel over the wire
//! (https://www.jsonrpc.org/specification):
//!
//! - **Request**: a call with an optional `id`; without one it is a notification
//! - **Response**: the outcome of a call, either a `result` or an `error`
//! - **Params**: positional (array) or named (object) arguments
//!
//! # Request IDs
//!
//! Ids correlate requests with responses. Strings and integers are accepted on
//! input and echoed back unchanged. A request whose id is absent or `null` is a
//! notification and never receives a response. Error responses for requests
//! whose id could not be read carry `Id::Null`.

use crate::error::{Error, JsonRpcErrorData, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Protocol version string carried in every message
pub const JSONRPC_VERSION: &str = "2.0";

/// Content type used by the HTTP binding for requests and responses
pub const JSONRPC_CONTENT_TYPE: &str = "application/json-rpc";

/// JSON-RPC request identifier
///
/// Used to match responses to the request that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    /// String identifier (what [`JsonRpcRequest`] builders in this workspace generate)
    String(String),
    /// Integer identifier
    Number(i64),
    /// Null identifier, only used on error responses for unreadable requests
    Null,
}

impl Id {
    /// Read the `id` member of a raw request object
    ///
    /// Returns `Ok(None)` for an absent or `null` id (a notification), and an
    /// `InvalidRequest` error when the id is present but is not a string or an
    /// integer.
    pub fn from_member(value: Option<&Value>) -> Result<Option<Id>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(Id::String(s.clone()))),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(|n| Some(Id::Number(n)))
                .ok_or_else(|| Error::InvalidRequest(format!("Unsupported id: {}", n))),
            Some(other) => Err(Error::InvalidRequest(format!("Unsupported id: {}", other))),
        }
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::String(s) => write!(f, "\"{}\"", s),
            Id::Number(n) => write!(f, "{}", n),
            Id::Null => write!(f, "null"),
        }
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::String(s)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::String(s.to_string())
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Number(n)
    }
}

impl From<Option<Id>> for Id {
    fn from(id: Option<Id>) -> Self {
        id.unwrap_or(Id::Null)
    }
}

/// Call arguments
///
/// Positional arguments bind to operation parameters by index, named arguments
/// bind by declared parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    /// Ordered arguments (`"params": [...]`)
    Positional(Vec<Value>),
    /// Arguments keyed by parameter name (`"params": {...}`)
    Named(Map<String, Value>),
}

impl Params {
    /// Read the `params` member of a raw request object
    ///
    /// Absent and `null` params both mean "no arguments". Scalars are rejected
    /// with `InvalidRequest`.
    pub fn from_member(value: Option<&Value>) -> Result<Option<Params>> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(Params::Positional(items.clone()))),
            Some(Value::Object(map)) => Ok(Some(Params::Named(map.clone()))),
            Some(other) => Err(Error::InvalidRequest(format!(
                "params must be an array or an object, got {}",
                other
            ))),
        }
    }

    /// Build params from an already serialized argument value
    ///
    /// `null` and empty arrays produce `None` so that the member is omitted on
    /// the wire. Any other scalar becomes a single positional argument.
    pub fn from_value(value: Value) -> Option<Params> {
        match value {
            Value::Null => None,
            Value::Array(items) if items.is_empty() => None,
            Value::Array(items) => Some(Params::Positional(items)),
            Value::Object(map) => Some(Params::Named(map)),
            scalar => Some(Params::Positional(vec![scalar])),
        }
    }

    /// Number of supplied arguments
    pub fn len(&self) -> usize {
        match self {
            Params::Positional(items) => items.len(),
            Params::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON-RPC request (or notification, when `id` is `None`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
}

impl JsonRpcRequest {
    /// Create a request that expects a response
    pub fn new(method: impl Into<String>, params: Option<Params>, id: impl Into<Id>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: Some(id.into()),
        }
    }

    /// Create a notification; no response will be produced for it
    pub fn notification(method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id: None,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC response
///
/// Exactly one of `result` and `error` is set. A successful call whose return
/// value is `null` carries `Some(Value::Null)` and serializes as `"result": null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorData>,
    pub id: Id,
}

impl JsonRpcResponse {
    pub fn success(result: Value, id: impl Into<Id>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id: id.into(),
        }
    }

    pub fn error(error: JsonRpcErrorData, id: impl Into<Id>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(error),
            id: id.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Convert into a JSON tree
    pub fn into_value(self) -> Value {
        let mut object = Map::new();
        object.insert("jsonrpc".to_string(), Value::String(self.jsonrpc));
        match self.error {
            Some(error) => {
                object.insert("error".to_string(), error.into_value());
            }
            None => {
                object.insert("result".to_string(), self.result.unwrap_or(Value::Null));
            }
        }
        let id = match self.id {
            Id::String(s) => Value::String(s),
            Id::Number(n) => Value::from(n),
            Id::Null => Value::Null,
        };
        object.insert("id".to_string(), id);
        Value::Object(object)
    }
}
