//! jrpc - JSON-RPC 2.0 dispatch engine
//!
//! This is the convenience crate that re-exports all jrpc sub-crates. Use it
//! when you want a single dependency for both client and server.
//!
//! # Architecture
//!
//! - **jrpc-core**: wire types, codec, error handling, observability
//! - **jrpc-server**: method registry, overload resolution, error mapping,
//!   dispatcher, TCP stream server and HTTP binding
//! - **jrpc-client**: typed calls and notifications over HTTP or TCP
//! - **jrpc-macros**: `#[operation]` for declaring operations
//!
//! # Quick Start - Server
//!
//! ```rust,no_run
//! use jrpc::{operation, JrpcServer, StreamServer};
//! use jrpc::server::Failure;
//!
//! #[operation]
//! async fn add(a: i64, b: i64) -> Result<i64, Failure> {
//!     Ok(a + b)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = JrpcServer::builder().operation(add()).build()?;
//!
//!     StreamServer::builder(server)
//!         .bind_str("127.0.0.1:10420")?
//!         .build()
//!         .await?
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Client
//!
//! ```rust,no_run
//! use jrpc::JrpcClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JrpcClient::builder("tcp://127.0.0.1:10420").build()?;
//!
//!     let sum: i64 = client.invoke("add", (5, 3)).await?;
//!     println!("Result: {}", sum);
//!
//!     Ok(())
//! }
//! ```

pub use jrpc_client as client;
pub use jrpc_core as core;
pub use jrpc_macros as macros;
pub use jrpc_server as server;

pub use jrpc_client::JrpcClient;
pub use jrpc_macros::operation;
pub use jrpc_server::{JrpcServer, StreamServer};
