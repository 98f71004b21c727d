//! Mapping handler failures to JSON-RPC errors
//!
//! When a handler fails, the server asks a chain of [`ErrorResolver`]s for the
//! error object to send. The first resolver that produces one wins:
//!
//! 1. [`DeclaredMappingResolver`]: the operation's own [`ErrorMapping`]s
//! 2. Custom resolvers registered on the server builder, in order
//! 3. [`ProtocolErrorResolver`]: failures carrying a `jrpc_core::Error`
//!    (including a handler-built `Error::JsonRpc`)
//! 4. [`DefaultErrorResolver`]: code `0`, the failure's message, and its type
//!    name as `data`
//!
//! The last step always produces an error, so resolution never fails.

use crate::failure::Failure;
use crate::operation::Operation;
use jrpc_core::error::UNMAPPED_FAILURE;
use jrpc_core::{Error, JsonRpcErrorData};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Declared mapping from a failure type to a fixed error
///
/// A mapping for `E` matches any failure that is an `E` or wraps one in its
/// `source()` chain.
#[derive(Clone)]
pub struct ErrorMapping {
    failure_type: &'static str,
    matches: fn(&Failure) -> bool,
    code: i32,
    message: Option<String>,
    data: Option<String>,
}

impl ErrorMapping {
    /// Map failures of type `E` to `code`
    pub fn new<E>(code: i32) -> Self
    where
        E: std::error::Error + 'static,
    {
        Self {
            failure_type: std::any::type_name::<E>(),
            matches: Failure::is::<E>,
            code,
            message: None,
            data: None,
        }
    }

    /// Fixed message; without one the failure's own message is sent
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Fixed data string; without one the failure's message is sent as data,
    /// and `data` is left out when that is empty too
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    /// Name of the mapped failure type
    pub fn failure_type(&self) -> &'static str {
        self.failure_type
    }

    pub fn matches(&self, failure: &Failure) -> bool {
        (self.matches)(failure)
    }

    /// Build the error object for a matching failure
    pub fn to_error_data(&self, failure: &Failure) -> JsonRpcErrorData {
        let failure_message = failure.message();
        let message = self
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| failure_message.clone());
        let data = self
            .data
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or(failure_message);

        if data.is_empty() {
            JsonRpcErrorData::new(self.code, message)
        } else {
            JsonRpcErrorData::with_data(self.code, message, Value::String(data))
        }
    }
}

impl fmt::Debug for ErrorMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMapping")
            .field("failure_type", &self.failure_type)
            .field("code", &self.code)
            .field("message", &self.message)
            .field("data", &self.data)
            .finish()
    }
}

/// Strategy turning a handler failure into an error object
///
/// Returning `None` passes the failure to the next resolver in the chain.
///
/// Plain functions and closures with the matching signature implement this
/// trait.
pub trait ErrorResolver: Send + Sync {
    fn resolve_error(&self, failure: &Failure, operation: &Operation) -> Option<JsonRpcErrorData>;
}

impl<F> ErrorResolver for F
where
    F: Fn(&Failure, &Operation) -> Option<JsonRpcErrorData> + Send + Sync,
{
    fn resolve_error(&self, failure: &Failure, operation: &Operation) -> Option<JsonRpcErrorData> {
        self(failure, operation)
    }
}

/// Applies the first of the operation's declared mappings that matches
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclaredMappingResolver;

impl ErrorResolver for DeclaredMappingResolver {
    fn resolve_error(&self, failure: &Failure, operation: &Operation) -> Option<JsonRpcErrorData> {
        operation
            .error_mappings()
            .iter()
            .find(|mapping| mapping.matches(failure))
            .map(|mapping| mapping.to_error_data(failure))
    }
}

/// Reports protocol errors raised inside handlers with their standard codes
#[derive(Debug, Default, Clone, Copy)]
pub struct ProtocolErrorResolver;

impl ErrorResolver for ProtocolErrorResolver {
    fn resolve_error(&self, failure: &Failure, _operation: &Operation) -> Option<JsonRpcErrorData> {
        failure.downcast_ref::<Error>().map(Error::to_error_data)
    }
}

/// Last resort: code `0` with the failure's type name as data
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultErrorResolver;

impl DefaultErrorResolver {
    pub fn error_data(failure: &Failure) -> JsonRpcErrorData {
        JsonRpcErrorData::with_data(
            UNMAPPED_FAILURE,
            failure.message(),
            Value::String(failure.type_name().to_string()),
        )
    }
}

impl ErrorResolver for DefaultErrorResolver {
    fn resolve_error(&self, failure: &Failure, _operation: &Operation) -> Option<JsonRpcErrorData> {
        Some(Self::error_data(failure))
    }
}

/// Ordered resolver chain with a guaranteed fallback
#[derive(Clone)]
pub struct ErrorResolverChain {
    resolvers: Vec<Arc<dyn ErrorResolver>>,
}

impl ErrorResolverChain {
    /// Chain with custom resolvers between declared mappings and the generic ones
    pub fn with_custom(custom: Vec<Arc<dyn ErrorResolver>>) -> Self {
        let mut resolvers: Vec<Arc<dyn ErrorResolver>> = Vec::with_capacity(custom.len() + 2);
        resolvers.push(Arc::new(DeclaredMappingResolver));
        resolvers.extend(custom);
        resolvers.push(Arc::new(ProtocolErrorResolver));
        Self { resolvers }
    }

    /// Resolve a failure; falls back to [`DefaultErrorResolver`]
    pub fn resolve(&self, failure: &Failure, operation: &Operation) -> JsonRpcErrorData {
        self.resolvers
            .iter()
            .find_map(|resolver| resolver.resolve_error(failure, operation))
            .unwrap_or_else(|| DefaultErrorResolver::error_data(failure))
    }
}

impl Default for ErrorResolverChain {
    fn default() -> Self {
        Self::with_custom(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::MessageFailure;
    use crate::handler::from_fn;
    use std::num::ParseIntError;

    fn operation(mappings: Vec<ErrorMapping>) -> Operation {
        let op = Operation::builder("op")
            .handler(from_fn(|_args: Vec<Value>| async { Ok::<_, Failure>(Value::Null) }));
        mappings.into_iter().fold(op, Operation::with_error_mapping)
    }

    fn parse_failure() -> Failure {
        Failure::from("x".parse::<i32>().unwrap_err())
    }

    #[test]
    fn test_declared_mapping_defaults_to_failure_message() {
        let op = operation(vec![ErrorMapping::new::<ParseIntError>(1234)]);
        let error = ErrorResolverChain::default().resolve(&parse_failure(), &op);

        assert_eq!(error.code, 1234);
        assert_eq!(error.message, "invalid digit found in string");
        assert_eq!(error.data, Some(Value::String(error.message.clone())));
    }

    #[test]
    fn test_declared_mapping_fixed_message_and_data() {
        let op = operation(vec![ErrorMapping::new::<ParseIntError>(7)
            .with_message("bad number")
            .with_data("digits only")]);
        let error = ErrorResolverChain::default().resolve(&parse_failure(), &op);

        assert_eq!(error.code, 7);
        assert_eq!(error.message, "bad number");
        assert_eq!(error.data, Some(Value::String("digits only".into())));
    }

    #[test]
    fn test_declared_mapping_omits_empty_data() {
        let op = operation(vec![ErrorMapping::new::<MessageFailure>(99).with_message("quiet")]);
        let error = ErrorResolverChain::default().resolve(&Failure::msg(""), &op);

        assert_eq!(error, JsonRpcErrorData::new(99, "quiet"));
        assert_eq!(error.into_value(), serde_json::json!({"code": 99, "message": "quiet"}));
    }

    #[test]
    fn test_first_matching_mapping_wins() {
        let op = operation(vec![
            ErrorMapping::new::<fmt::Error>(1),
            ErrorMapping::new::<ParseIntError>(2),
            ErrorMapping::new::<ParseIntError>(3),
        ]);
        let error = ErrorResolverChain::default().resolve(&parse_failure(), &op);
        assert_eq!(error.code, 2);
    }

    #[test]
    fn test_protocol_error_passthrough() {
        let op = operation(Vec::new());
        let failure = Failure::from(Error::JsonRpc(JsonRpcErrorData::new(42, "boom")));
        let error = ErrorResolverChain::default().resolve(&failure, &op);
        assert_eq!(error, JsonRpcErrorData::new(42, "boom"));

        let failure = Failure::from(Error::InvalidParams("expected a string".into()));
        let error = ErrorResolverChain::default().resolve(&failure, &op);
        assert_eq!(error.code, jrpc_core::error::INVALID_PARAMS);
    }

    #[test]
    fn test_unmapped_failure_reports_type_name() {
        let op = operation(Vec::new());
        let error = ErrorResolverChain::default().resolve(&parse_failure(), &op);

        assert_eq!(error.code, 0);
        assert_eq!(error.message, "invalid digit found in string");
        assert_eq!(
            error.data,
            Some(Value::String(std::any::type_name::<ParseIntError>().into()))
        );
    }

    #[test]
    fn test_custom_resolver_after_declared_mappings() {
        let custom: Arc<dyn ErrorResolver> =
            Arc::new(|_f: &Failure, _op: &Operation| Some(JsonRpcErrorData::new(-1, "custom")));
        let chain = ErrorResolverChain::with_custom(vec![custom]);

        let mapped = operation(vec![ErrorMapping::new::<ParseIntError>(1234)]);
        assert_eq!(chain.resolve(&parse_failure(), &mapped).code, 1234);

        let unmapped = operation(Vec::new());
        assert_eq!(chain.resolve(&parse_failure(), &unmapped).code, -1);
    }
}
