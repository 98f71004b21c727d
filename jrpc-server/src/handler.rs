//! Handler traits and adapters for operations
//!
//! A handler is the executable half of an [`Operation`](crate::Operation). By
//! the time it runs, the resolver has already chosen the operation and bound
//! the request's params to a positional argument list whose length equals the
//! operation's declared parameter count (missing arguments are `null`).
//!
//! # Creating Handlers
//!
//! 1. **from_fn**: wrap an async closure over the raw argument list
//! 2. **from_typed_fn**: wrap an async closure over a deserialized tuple (or
//!    any type that deserializes from a JSON array)
//! 3. **#[operation]**: annotate an async fn (via `jrpc-macros`)
//!
//! # Examples
//!
//! ```rust
//! use jrpc_server::{from_fn, from_typed_fn, Failure};
//! use serde_json::{json, Value};
//!
//! // Raw arguments
//! let echo = from_fn(|args: Vec<Value>| async move {
//!     Ok::<_, Failure>(json!(args))
//! });
//!
//! // Typed arguments: [a, b] becomes (i64, i64)
//! let add = from_typed_fn(|(a, b): (i64, i64)| async move {
//!     Ok::<_, std::convert::Infallible>(a + b)
//! });
//! ```

use crate::failure::Failure;
use futures::future::{BoxFuture, FutureExt};
use jrpc_core::Error;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Boxed future returned by every handler
pub type HandlerResult = BoxFuture<'static, Result<Value, Failure>>;

/// Executable body of an operation
///
/// You rarely implement this directly; use [`from_fn`], [`from_typed_fn`] or
/// the `#[operation]` attribute.
pub trait Handler: Send + Sync {
    /// Run the operation with its bound arguments
    ///
    /// `args` has exactly one entry per declared parameter, in declaration
    /// order. A returned `Failure` is turned into a JSON-RPC error by the
    /// server's error resolver chain.
    fn call(&self, args: Vec<Value>) -> HandlerResult;
}

/// Adapter from an async function over raw arguments to a [`Handler`]
pub struct AsyncHandler<F> {
    func: F,
}

impl<F, Fut> Handler for AsyncHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, Failure>> + Send + 'static,
{
    fn call(&self, args: Vec<Value>) -> HandlerResult {
        (self.func)(args).boxed()
    }
}

/// Create a handler from an async function over the raw argument list
pub fn from_fn<F, Fut>(func: F) -> Box<dyn Handler>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, Failure>> + Send + 'static,
{
    Box::new(AsyncHandler { func })
}

/// Create a handler with argument and result conversion
///
/// The bound arguments are deserialized as a JSON array into `P`, so tuples
/// and `Deserialize` structs both work. An operation with no parameters
/// deserializes `P` from `null`, which suits `()`.
///
/// # Error Handling
///
/// - Arguments that do not convert to `P` fail with `Error::InvalidParams`,
///   reported to the caller as `-32602`
/// - A result that does not serialize fails with `Error::Serialization`
/// - Errors returned by `func` are wrapped as they are, keeping their type for
///   error mappings
///
/// # Examples
///
/// ```rust
/// use jrpc_server::{from_typed_fn, Failure};
///
/// let greet = from_typed_fn(|(name,): (String,)| async move {
///     if name.is_empty() {
///         return Err(Failure::msg("name is empty"));
///     }
///     Ok(format!("hello {}", name))
/// });
/// ```
pub fn from_typed_fn<P, R, E, F, Fut>(func: F) -> Box<dyn Handler>
where
    P: serde::de::DeserializeOwned + Send + 'static,
    R: serde::Serialize + Send + 'static,
    E: Into<Failure> + Send + 'static,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let func = Arc::new(func);

    from_fn(move |args: Vec<Value>| {
        let func = Arc::clone(&func);
        async move {
            let input = if args.is_empty() {
                Value::Null
            } else {
                Value::Array(args)
            };
            let params: P = serde_json::from_value(input)
                .map_err(|e| Failure::from(Error::InvalidParams(e.to_string())))?;

            let result = func(params).await.map_err(Into::<Failure>::into)?;

            serde_json::to_value(result)
                .map_err(|e| Failure::from(Error::Serialization(e.to_string())))
        }
    })
}
