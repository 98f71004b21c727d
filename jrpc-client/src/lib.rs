//! JSON-RPC 2.0 client side of jrpc
//!
//! This crate calls JSON-RPC 2.0 services over HTTP or raw TCP. It includes:
//!
//! - **Calls and notifications**: typed `invoke` and fire-and-forget `notify`
//! - **Transports**: HTTP POST (reqwest) and TCP streams, or your own
//!   [`Transport`]
//! - **Exception resolvers**: turn error responses into your own error types
//! - **Listeners**: see and edit every request and response document
//! - **Observability**: tracing spans and OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrpc_client::JrpcClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JrpcClient::builder("http://localhost:8080/").build()?;
//!
//!     // Positional arguments
//!     let sum: i64 = client.invoke("add", (5, 3)).await?;
//!
//!     // Named arguments
//!     let greeting: String = client.invoke("greet", json!({"name": "Ada"})).await?;
//!
//!     // No response expected
//!     client.notify("log", ["started"]).await?;
//!
//!     println!("{} {}", sum, greeting);
//!     Ok(())
//! }
//! ```

mod client;
mod client_builder;
mod exception;
mod listener;
mod metrics;
mod request;
mod transport;

pub use client::JrpcClient;
pub use client_builder::ClientBuilder;
pub use exception::{DefaultExceptionResolver, ExceptionResolver};
pub use listener::{LoggingListener, RequestListener};
pub use metrics::ClientMetrics;
pub use request::next_id;
pub use transport::{
    HttpTransport, StreamTransport, Transport, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT,
};
