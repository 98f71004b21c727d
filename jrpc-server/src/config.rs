//! Dispatcher configuration

/// Behavior switches for a [`JrpcServer`](crate::JrpcServer)
///
/// # Defaults
///
/// Strict arity (no extra or missing params), failures are answered but not
/// re-raised, batches and documents are unbounded.
///
/// # Examples
///
/// ```rust
/// use jrpc_server::ServerConfig;
///
/// let config = ServerConfig::default()
///     .with_extra_params_allowed(true)
///     .with_max_batch_size(100);
/// assert!(config.extra_params_allowed);
/// assert!(!config.fewer_params_allowed);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Accept more params than an operation declares; extras are dropped
    pub extra_params_allowed: bool,

    /// Accept fewer params than an operation declares; missing ones are `null`
    pub fewer_params_allowed: bool,

    /// After writing the error response for a failed handler, also return the
    /// failure to the caller of the streaming `handle`
    ///
    /// Only the stream paths (`handle` and the stream server) can re-raise.
    /// The in-memory `handle_*` methods and the HTTP binding still answer with
    /// the mapped error and log the failure at error level.
    pub rethrow_failures: bool,

    /// Reject batches with more elements than this
    pub max_batch_size: Option<usize>,

    /// Longest accepted request document in bytes
    ///
    /// A longer document is answered with a parse error; stream connections
    /// are closed afterwards.
    pub max_document_size: Option<usize>,
}

impl ServerConfig {
    pub fn with_extra_params_allowed(mut self, allowed: bool) -> Self {
        self.extra_params_allowed = allowed;
        self
    }

    pub fn with_fewer_params_allowed(mut self, allowed: bool) -> Self {
        self.fewer_params_allowed = allowed;
        self
    }

    pub fn with_rethrow_failures(mut self, rethrow: bool) -> Self {
        self.rethrow_failures = rethrow;
        self
    }

    pub fn with_max_batch_size(mut self, limit: usize) -> Self {
        self.max_batch_size = Some(limit);
        self
    }

    pub fn with_max_document_size(mut self, limit: usize) -> Self {
        self.max_document_size = Some(limit);
        self
    }
}
