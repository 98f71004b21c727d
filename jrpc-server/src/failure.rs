//! Handler failures
//!
//! A [`Failure`] is whatever an operation raised while running. It wraps any
//! `std::error::Error` together with the name of its concrete type, which the
//! error resolver chain needs: declared error mappings match on the type, and
//! the generic fallback reports the type name as `error.data`.
//!
//! Any `std::error::Error + Send + Sync + 'static` converts into a `Failure`,
//! so handlers can use `?` directly:
//!
//! ```rust
//! use jrpc_server::Failure;
//!
//! fn parse(input: &str) -> Result<i64, Failure> {
//!     Ok(input.parse::<i64>()?)
//! }
//!
//! let failure = parse("x").unwrap_err();
//! assert!(failure.is::<std::num::ParseIntError>());
//! assert_eq!(
//!     failure.type_name(),
//!     std::any::type_name::<std::num::ParseIntError>()
//! );
//! ```

use std::error::Error as StdError;
use std::fmt;

/// Failure raised by an operation handler
pub struct Failure {
    error: Box<dyn StdError + Send + Sync + 'static>,
    type_name: &'static str,
}

impl Failure {
    /// Wrap an error, remembering its concrete type
    pub fn new<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            error: Box::new(error),
            type_name: std::any::type_name::<E>(),
        }
    }

    /// Failure carrying only a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageFailure(message.into()))
    }

    /// The failure's own message
    pub fn message(&self) -> String {
        self.error.to_string()
    }

    /// Fully qualified name of the wrapped error type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether the wrapped error, or any error in its `source()` chain, is an `E`
    ///
    /// This is the "instance of" test used by error mappings: a mapping for a
    /// wrapper type also claims failures that wrap it.
    pub fn is<E>(&self) -> bool
    where
        E: StdError + 'static,
    {
        self.chain().any(|e| e.is::<E>())
    }

    /// First error of type `E` in the `source()` chain
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.chain().find_map(|e| e.downcast_ref::<E>())
    }

    /// The wrapped error followed by its sources
    pub fn chain(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        let head: &(dyn StdError + 'static) = &*self.error;
        std::iter::successors(Some(head), |e| (*e).source())
    }
}

impl<E> From<E> for Failure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Failure::new(error)
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Failure")
            .field("type_name", &self.type_name)
            .field("error", &self.error)
            .finish()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

/// Plain message failure produced by [`Failure::msg`]
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MessageFailure(String);
