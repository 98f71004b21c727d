//! Client builder
//!
//! `ClientBuilder` configures a [`JrpcClient`] before use:
//! - Transport selection from the URL scheme, timeouts and extra headers
//! - A custom exception resolver and request listeners
//! - Observability (OpenTelemetry) and the service name used for telemetry
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_client::{ClientBuilder, LoggingListener};
//! use std::time::Duration;
//!
//! # fn example() -> jrpc_core::Result<()> {
//! let client = ClientBuilder::new("http://localhost:8080/")
//!     .connect_timeout(Duration::from_secs(5))
//!     .read_timeout(Duration::from_secs(30))
//!     .header("Authorization", "Bearer secret")
//!     .listener(LoggingListener)
//!     .build()?;
//!
//! // Raw TCP
//! let stream_client = ClientBuilder::new("tcp://127.0.0.1:10420").build()?;
//! # Ok(())
//! # }
//! ```

use crate::exception::{DefaultExceptionResolver, ExceptionResolver};
use crate::listener::RequestListener;
use crate::transport::{
    HttpTransport, StreamTransport, Transport, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT,
};
use crate::{ClientMetrics, JrpcClient};
use jrpc_core::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

const TCP_SCHEME: &str = "tcp://";

/// Builder for configuring and creating a JrpcClient
pub struct ClientBuilder {
    url: String,
    connect_timeout: Duration,
    read_timeout: Duration,
    headers: Vec<(String, String)>,
    exception_resolver: Option<Arc<dyn ExceptionResolver>>,
    listeners: Vec<Arc<dyn RequestListener>>,
    observability_config: Option<jrpc_core::ObservabilityConfig>,
    service_name: Option<String>,
}

impl ClientBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            headers: Vec::new(),
            exception_resolver: None,
            listeners: Vec::new(),
            observability_config: None,
            service_name: None,
        }
    }

    /// Time allowed to establish a connection (default 60 s)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Time allowed for the response to arrive (default 120 s)
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Add a header to every HTTP request (ignored by the TCP transport)
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Map error responses with a custom resolver
    pub fn exception_resolver(mut self, resolver: impl ExceptionResolver + 'static) -> Self {
        self.exception_resolver = Some(Arc::new(resolver));
        self
    }

    /// Add a listener; listeners run in the order they were added
    pub fn listener(mut self, listener: impl RequestListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: jrpc_core::ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(jrpc_core::ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the client with the transport the URL calls for
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` for an unsupported URL scheme and
    /// `Error::Http` for invalid header names or values.
    pub fn build(self) -> Result<JrpcClient> {
        let transport: Arc<dyn Transport> = if let Some(addr) = self.url.strip_prefix(TCP_SCHEME) {
            Arc::new(
                StreamTransport::new(addr)
                    .with_connect_timeout(self.connect_timeout)
                    .with_read_timeout(self.read_timeout),
            )
        } else if self.url.starts_with("http://") || self.url.starts_with("https://") {
            Arc::new(HttpTransport::new(
                self.url.clone(),
                self.connect_timeout,
                self.read_timeout,
                &self.headers,
            )?)
        } else {
            return Err(Error::InvalidRequest(format!(
                "Unsupported URL scheme: {}",
                self.url
            )));
        };

        tracing::info!(url = %self.url, "JSON-RPC client configured");
        self.finish(transport)
    }

    /// Build the client over a caller-supplied transport
    ///
    /// The URL, timeouts and headers are not used.
    pub fn build_with_transport(self, transport: impl Transport + 'static) -> Result<JrpcClient> {
        self.finish(Arc::new(transport))
    }

    fn finish(self, transport: Arc<dyn Transport>) -> Result<JrpcClient> {
        let metrics = if let Some(mut config) = self.observability_config {
            if let Some(name) = self.service_name {
                config.service_name = name;
            }

            jrpc_core::init_observability(config.clone()).map_err(|e| {
                Error::Internal(format!("Failed to initialize observability: {}", e))
            })?;

            Some(Arc::new(ClientMetrics::new(&config.service_name)))
        } else {
            None
        };

        Ok(JrpcClient {
            transport,
            exception_resolver: self
                .exception_resolver
                .unwrap_or_else(|| Arc::new(DefaultExceptionResolver)),
            listeners: Arc::from(self.listeners),
            metrics,
        })
    }
}
