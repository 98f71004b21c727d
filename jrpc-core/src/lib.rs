//! Core JSON-RPC 2.0 types and codec for jrpc
//!
//! This crate provides the pieces shared by the jrpc server and client:
//!
//! - **Types**: requests, responses, ids and params as they appear on the wire
//! - **Codec**: JSON parsing and serialization, stream framing, the legacy GET form
//! - **Error handling**: the crate-wide `Error` and the wire `JsonRpcErrorData`
//! - **Observability**: tracing subscriber and OpenTelemetry setup
//!
//! # Architecture
//!
//! The crate is transport-agnostic. `jrpc-server` builds the method registry and
//! dispatcher on top of it, `jrpc-client` the request builder and response
//! correlator.
//!
//! # Example
//!
//! ```rust
//! use jrpc_core::{codec, JsonRpcRequest, Params};
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::new("add", Params::from_value(json!([5, 3])), "1");
//! let text = codec::encode(&request).unwrap();
//!
//! let value = codec::decode(text.as_bytes()).unwrap();
//! assert_eq!(value["params"], json!([5, 3]));
//! ```

pub mod codec;
pub mod error;
pub mod observability;
pub mod types;

pub use error::{Error, JsonRpcErrorData, Result};
pub use observability::{init_observability, shutdown_observability, ObservabilityConfig};
pub use types::{Id, JsonRpcRequest, JsonRpcResponse, Params, JSONRPC_CONTENT_TYPE, JSONRPC_VERSION};
