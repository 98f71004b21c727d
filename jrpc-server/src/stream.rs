//! TCP stream server
//!
//! [`StreamServer`] exposes a [`JrpcServer`] on a TCP socket. Each accepted
//! connection runs on its own task and may carry any number of request
//! documents back to back; every response is written as one JSON document.
//!
//! # Concurrency
//!
//! At most `max_concurrency` connections are served at once. The accept loop
//! takes a permit before accepting, so when every permit is held new clients
//! wait in the listen backlog until a connection closes.
//!
//! # Lifecycle
//!
//! 1. **Build**: `StreamServer::builder(server).bind(addr).build().await`
//!    binds the socket
//! 2. **Run**: `run()` accepts connections until shutdown
//! 3. **Shutdown**: `shutdown()` (or a [`ShutdownHandle`]) stops accepting;
//!    connections already being served finish on their own
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_server::{JrpcServer, StreamServer};
//!
//! # async fn example(server: JrpcServer) -> jrpc_core::Result<()> {
//! let stream_server = StreamServer::builder(server)
//!     .bind_str("127.0.0.1:10420")?
//!     .max_concurrency(16)
//!     .build()
//!     .await?;
//!
//! let shutdown = stream_server.shutdown_handle();
//! tokio::spawn(async move {
//!     tokio::signal::ctrl_c().await.ok();
//!     shutdown.shutdown();
//! });
//!
//! stream_server.run().await?;
//! # Ok(())
//! # }
//! ```

use crate::dispatcher::JrpcServer;
use jrpc_core::{Error, Result};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Semaphore};

/// Port used when no bind address is given
pub const DEFAULT_PORT: u16 = 10420;

/// Connections served at once when no limit is given
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Builder for [`StreamServer`]
pub struct StreamServerBuilder {
    server: JrpcServer,
    addr: SocketAddr,
    max_concurrency: usize,
}

impl StreamServerBuilder {
    /// Set the bind address (default `0.0.0.0:10420`)
    pub fn bind(mut self, addr: impl Into<SocketAddr>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set the bind address from a string (e.g., "127.0.0.1:10420")
    pub fn bind_str(mut self, addr: &str) -> Result<Self> {
        self.addr = addr
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("Invalid address: {}", e)))?;
        Ok(self)
    }

    /// Limit the number of connections served at once (minimum 1)
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    /// Bind the listening socket
    pub async fn build(self) -> Result<StreamServer> {
        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, _) = watch::channel(false);

        tracing::info!(
            addr = %local_addr,
            max_concurrency = self.max_concurrency,
            "Stream server listening"
        );

        Ok(StreamServer {
            listener,
            server: self.server,
            permits: Arc::new(Semaphore::new(self.max_concurrency)),
            max_concurrency: self.max_concurrency,
            shutdown_tx: Arc::new(shutdown_tx),
        })
    }
}

/// JSON-RPC server over TCP streams
pub struct StreamServer {
    listener: TcpListener,
    server: JrpcServer,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
    shutdown_tx: Arc<watch::Sender<bool>>,
}

/// Stops a running [`StreamServer`] from another task
#[derive(Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

impl StreamServer {
    pub fn builder(server: JrpcServer) -> StreamServerBuilder {
        StreamServerBuilder {
            server,
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Connections currently being served
    pub fn active_connections(&self) -> usize {
        self.max_concurrency - self.permits.available_permits()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            tx: Arc::clone(&self.shutdown_tx),
        }
    }

    /// Stop accepting connections
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Accept and serve connections until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if accepting a connection fails.
    #[tracing::instrument(skip(self), name = "stream_server.run")]
    pub async fn run(&self) -> Result<()> {
        tracing::info!("Starting JSON-RPC stream server");
        let conn_counter = AtomicU64::new(0);
        let mut shutdown = self.shutdown_tx.subscribe();

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            let permit = tokio::select! {
                permit = Arc::clone(&self.permits).acquire_owned() => permit
                    .map_err(|_| Error::Internal("Connection pool closed".to_string()))?,
                _ = shutdown.changed() => continue,
            };

            let (stream, addr) = tokio::select! {
                accepted = self.listener.accept() => accepted?,
                _ = shutdown.changed() => continue,
            };

            let conn_id = conn_counter.fetch_add(1, Ordering::SeqCst);
            let server = self.server.clone();
            let active = self.active_connections() as i64;

            tracing::info!(conn_id = conn_id, addr = %addr, "New connection accepted");
            if let Some(m) = server.metrics() {
                m.record_connection(active);
            }

            let permits = Arc::clone(&self.permits);
            let max_concurrency = self.max_concurrency;
            tokio::spawn(async move {
                if let Err(e) = serve_connection(&server, stream, conn_id).await {
                    tracing::error!(conn_id = conn_id, error = %e, "Connection error");
                }
                drop(permit);

                tracing::info!(conn_id = conn_id, "Connection closed");
                if let Some(m) = server.metrics() {
                    let active = max_concurrency - permits.available_permits();
                    m.record_disconnection(active as i64);
                }
            });
        }

        tracing::info!("Stream server stopped accepting connections");
        Ok(())
    }
}

#[tracing::instrument(skip(server, stream), fields(conn_id = conn_id))]
async fn serve_connection(server: &JrpcServer, mut stream: TcpStream, conn_id: u64) -> Result<()> {
    let (mut reader, mut writer) = stream.split();
    let mut buf = Vec::new();

    while server.handle_next(&mut reader, &mut writer, &mut buf).await? {}

    Ok(())
}
