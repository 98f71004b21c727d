//! Server builder
//!
//! Fluent construction of a [`JrpcServer`]: register operations, choose the
//! dispatch behavior, add custom error resolvers and enable observability.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_server::{from_typed_fn, Failure, JrpcServer, Operation};
//!
//! # fn example() -> jrpc_core::Result<()> {
//! let server = JrpcServer::builder()
//!     .operation(
//!         Operation::builder("ping")
//!             .handler(from_typed_fn(|(): ()| async { Ok::<_, Failure>("pong") })),
//!     )
//!     .extra_params_allowed(true)
//!     .max_batch_size(100)
//!     .build()?;
//!
//! assert!(server.registry().has_method("ping"));
//! # Ok(())
//! # }
//! ```

use crate::config::ServerConfig;
use crate::dispatcher::JrpcServer;
use crate::error_resolver::{ErrorResolver, ErrorResolverChain};
use crate::metrics::ServerMetrics;
use crate::operation::Operation;
use crate::registry::MethodRegistry;
use jrpc_core::{Error, ObservabilityConfig, Result};
use std::sync::Arc;

/// Builder for constructing a JSON-RPC server
pub struct ServerBuilder {
    operations: Vec<Operation>,
    config: ServerConfig,
    error_resolvers: Vec<Arc<dyn ErrorResolver>>,
    observability_config: Option<ObservabilityConfig>,
    service_name: Option<String>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            config: ServerConfig::default(),
            error_resolvers: Vec::new(),
            observability_config: None,
            service_name: None,
        }
    }

    /// Register an operation
    ///
    /// Operations sharing a name are overloads, tried in registration order.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    /// Replace the whole dispatch configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn extra_params_allowed(mut self, allowed: bool) -> Self {
        self.config.extra_params_allowed = allowed;
        self
    }

    pub fn fewer_params_allowed(mut self, allowed: bool) -> Self {
        self.config.fewer_params_allowed = allowed;
        self
    }

    pub fn rethrow_failures(mut self, rethrow: bool) -> Self {
        self.config.rethrow_failures = rethrow;
        self
    }

    /// Set the maximum batch size limit
    pub fn max_batch_size(mut self, max_size: usize) -> Self {
        self.config.max_batch_size = Some(max_size);
        self
    }

    /// Set the maximum request document size in bytes
    pub fn max_document_size(mut self, max_size: usize) -> Self {
        self.config.max_document_size = Some(max_size);
        self
    }

    /// Add a resolver consulted after the operation's declared error mappings
    pub fn error_resolver(mut self, resolver: Arc<dyn ErrorResolver>) -> Self {
        self.error_resolvers.push(resolver);
        self
    }

    /// Enable OpenTelemetry observability with custom configuration
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability_config = Some(config);
        self
    }

    /// Enable OpenTelemetry observability with default configuration
    pub fn with_default_observability(mut self) -> Self {
        self.observability_config = Some(ObservabilityConfig::default());
        self
    }

    /// Set service name for observability (used if observability is enabled)
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Build the server
    ///
    /// # Errors
    ///
    /// Fails only when observability is enabled and cannot be initialized.
    pub fn build(self) -> Result<JrpcServer> {
        let metrics = match self.observability_config {
            Some(mut config) => {
                if let Some(name) = self.service_name {
                    config.service_name = name;
                }

                jrpc_core::init_observability(config.clone()).map_err(|e| {
                    Error::Internal(format!("Failed to initialize observability: {}", e))
                })?;

                Some(Arc::new(ServerMetrics::new(config.service_name)))
            }
            None => None,
        };

        let registry = MethodRegistry::new(self.operations);
        tracing::info!(
            operations = registry.len(),
            methods = ?registry.methods(),
            extra_params_allowed = self.config.extra_params_allowed,
            fewer_params_allowed = self.config.fewer_params_allowed,
            "JSON-RPC server built"
        );

        Ok(JrpcServer::from_parts(
            registry,
            self.config,
            ErrorResolverChain::with_custom(self.error_resolvers),
            metrics,
        ))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Failure;
    use crate::handler::from_fn;
    use serde_json::Value;

    fn op(name: &str) -> Operation {
        Operation::builder(name)
            .handler(from_fn(|_args: Vec<Value>| async { Ok::<_, Failure>(Value::Null) }))
    }

    #[test]
    fn test_builder_basic() {
        let server = ServerBuilder::new().operation(op("test")).build().unwrap();
        assert!(server.registry().has_method("test"));
        assert_eq!(server.config(), &ServerConfig::default());
    }

    #[test]
    fn test_builder_flags() {
        let server = ServerBuilder::new()
            .extra_params_allowed(true)
            .fewer_params_allowed(true)
            .rethrow_failures(true)
            .max_batch_size(50)
            .max_document_size(4096)
            .build()
            .unwrap();

        let config = server.config();
        assert!(config.extra_params_allowed);
        assert!(config.fewer_params_allowed);
        assert!(config.rethrow_failures);
        assert_eq!(config.max_batch_size, Some(50));
        assert_eq!(config.max_document_size, Some(4096));
    }

    #[test]
    fn test_builder_config_replaces_flags() {
        let server = ServerBuilder::new()
            .max_batch_size(5)
            .config(ServerConfig::default().with_fewer_params_allowed(true))
            .build()
            .unwrap();
        assert!(server.config().fewer_params_allowed);
        assert_eq!(server.config().max_batch_size, None);
    }

    #[test]
    fn test_builder_overloads_kept() {
        let server = ServerBuilder::new()
            .operations(vec![op("a"), op("a"), op("b")])
            .build()
            .unwrap();
        assert_eq!(server.registry().len(), 3);
        assert_eq!(server.registry().methods(), vec!["a", "b"]);
    }

    #[test]
    fn test_builder_default() {
        let builder = ServerBuilder::default();
        assert!(builder.operations.is_empty());
        assert!(builder.observability_config.is_none());
    }
}
