//! Turning error responses into client errors
//!
//! When a response carries an `error` member, the client hands the error
//! object to an [`ExceptionResolver`] and returns whatever it produces. The
//! default resolver returns `Error::JsonRpc` carrying code, message and data
//! unchanged. Custom resolvers typically rebuild application error types and
//! wrap them in `Error::Remote`.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_client::ExceptionResolver;
//! use jrpc_core::{Error, JsonRpcErrorData};
//! use std::sync::Arc;
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("account {0} is locked")]
//! struct AccountLocked(String);
//!
//! let resolver = |error: &JsonRpcErrorData| match error.code {
//!     4001 => Error::Remote(Arc::new(AccountLocked(error.message.clone()))),
//!     _ => Error::JsonRpc(error.clone()),
//! };
//!
//! let err = resolver.resolve_exception(&JsonRpcErrorData::new(4001, "alice"));
//! assert_eq!(err.to_string(), "Remote failure: account alice is locked");
//! ```

use jrpc_core::{Error, JsonRpcErrorData};

/// Maps the `error` member of a response to the error returned to the caller
pub trait ExceptionResolver: Send + Sync {
    fn resolve_exception(&self, error: &JsonRpcErrorData) -> Error;
}

impl<F> ExceptionResolver for F
where
    F: Fn(&JsonRpcErrorData) -> Error + Send + Sync,
{
    fn resolve_exception(&self, error: &JsonRpcErrorData) -> Error {
        self(error)
    }
}

/// Returns the error object as `Error::JsonRpc`
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultExceptionResolver;

impl ExceptionResolver for DefaultExceptionResolver {
    fn resolve_exception(&self, error: &JsonRpcErrorData) -> Error {
        Error::JsonRpc(error.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_keeps_code_message_and_data() {
        let data = JsonRpcErrorData::with_data(42, "boom", json!({"hint": "retry"}));
        let err = DefaultExceptionResolver.resolve_exception(&data);

        assert_eq!(err.code(), Some(42));
        match err {
            Error::JsonRpc(inner) => {
                assert_eq!(inner.message, "boom");
                assert_eq!(inner.data, Some(json!({"hint": "retry"})));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |error: &JsonRpcErrorData| Error::Internal(error.message.clone());
        let err = resolver.resolve_exception(&JsonRpcErrorData::new(1, "nope"));
        assert!(matches!(err, Error::Internal(ref m) if m == "nope"));
    }
}
