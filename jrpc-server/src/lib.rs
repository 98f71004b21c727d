//! JSON-RPC 2.0 server side of jrpc
//!
//! This crate turns a set of operations into a JSON-RPC 2.0 endpoint. It
//! includes:
//!
//! - **Method registry**: operations grouped by name, overloads included
//! - **Overload resolution**: arity rules, positional and named binding
//! - **Error mapping**: declared per-operation mappings and a resolver chain
//! - **Dispatcher**: requests, notifications and batches from any document
//!   source
//! - **Transports**: a TCP stream server and an HTTP binding (axum)
//! - **Observability**: tracing spans and OpenTelemetry metrics
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use jrpc_server::{from_typed_fn, Failure, JrpcServer, Operation, StreamServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = JrpcServer::builder()
//!         .operation(
//!             Operation::builder("add")
//!                 .param::<i64>("a")
//!                 .param::<i64>("b")
//!                 .handler(from_typed_fn(|(a, b): (i64, i64)| async move {
//!                     Ok::<_, Failure>(a + b)
//!                 })),
//!         )
//!         .build()?;
//!
//!     let stream_server = StreamServer::builder(server)
//!         .bind_str("127.0.0.1:10420")?
//!         .build()
//!         .await?;
//!     stream_server.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! A [`JrpcServer`] owns an immutable [`MethodRegistry`] and a
//! [`ServerConfig`]. Each document is dispatched independently: validate,
//! look up the candidates for the method name, resolve one operation and bind
//! its arguments, run the handler, and map any [`Failure`] through the
//! [`ErrorResolverChain`]. The server is cheap to clone, and transports give
//! every connection or HTTP request its own clone.

mod batch;
mod builder;
mod config;
mod dispatcher;
mod error_resolver;
mod failure;
mod handler;
pub mod http;
mod metrics;
mod operation;
mod registry;
pub mod resolver;
mod stream;

pub use builder::ServerBuilder;
pub use config::ServerConfig;
pub use dispatcher::JrpcServer;
pub use error_resolver::{
    DeclaredMappingResolver, DefaultErrorResolver, ErrorMapping, ErrorResolver,
    ErrorResolverChain, ProtocolErrorResolver,
};
pub use failure::{Failure, MessageFailure};
pub use handler::{from_fn, from_typed_fn, AsyncHandler, Handler, HandlerResult};
pub use metrics::ServerMetrics;
pub use operation::{Operation, OperationBuilder, ParamSpec};
pub use registry::{Candidates, MethodRegistry, RegistryBuilder};
pub use resolver::BoundCall;
pub use stream::{
    ShutdownHandle, StreamServer, StreamServerBuilder, DEFAULT_MAX_CONCURRENCY, DEFAULT_PORT,
};
