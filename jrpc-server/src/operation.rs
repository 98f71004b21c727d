//! Operation descriptors
//!
//! An [`Operation`] is one callable entry of a handler surface: a method name,
//! an ordered list of declared parameters, optional error mappings and the
//! handler that runs it. Several operations may share a name (overloads); the
//! resolver picks between them per request.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_server::{from_typed_fn, ErrorMapping, Failure, Operation};
//!
//! let op = Operation::builder("testMethod")
//!     .param::<String>("param1")
//!     .error_mapping(ErrorMapping::new::<std::num::ParseIntError>(1234))
//!     .handler(from_typed_fn(|(param1,): (String,)| async move {
//!         Ok::<_, Failure>(format!("got {}", param1))
//!     }));
//!
//! assert_eq!(op.name(), "testMethod");
//! assert_eq!(op.arity(), 1);
//! ```

use crate::error_resolver::ErrorMapping;
use crate::handler::Handler;
use std::fmt;
use std::sync::Arc;

/// One declared parameter of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    /// Name used to bind named params; `None` for positional-only parameters
    pub name: Option<String>,

    /// Rust type the handler converts the argument into
    pub type_name: &'static str,
}

impl ParamSpec {
    /// Parameter addressable by name and position
    pub fn named<T: ?Sized>(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Parameter addressable only by position
    pub fn positional<T: ?Sized>() -> Self {
        Self {
            name: None,
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// A registered method implementation
pub struct Operation {
    name: String,
    params: Vec<ParamSpec>,
    error_mappings: Vec<ErrorMapping>,
    handler: Arc<dyn Handler>,
}

impl Operation {
    /// Start describing an operation with the given method name
    pub fn builder(name: impl Into<String>) -> OperationBuilder {
        OperationBuilder {
            name: name.into(),
            params: Vec::new(),
            error_mappings: Vec::new(),
        }
    }

    /// Add an error mapping after construction
    ///
    /// Mappings are consulted in the order they were added.
    pub fn with_error_mapping(mut self, mapping: ErrorMapping) -> Self {
        self.error_mappings.push(mapping);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Number of declared parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Declared parameter names, when every parameter has one
    pub fn param_names(&self) -> Option<Vec<&str>> {
        self.params.iter().map(|p| p.name.as_deref()).collect()
    }

    pub fn error_mappings(&self) -> &[ErrorMapping] {
        &self.error_mappings
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// Human-readable signature, e.g. `add(a: i64, b: i64)`
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| match &p.name {
                Some(name) => format!("{}: {}", name, p.type_name),
                None => format!("#{}: {}", i, p.type_name),
            })
            .collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("error_mappings", &self.error_mappings)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Operation`]
///
/// Parameters are declared in call order; `handler` completes the operation.
pub struct OperationBuilder {
    name: String,
    params: Vec<ParamSpec>,
    error_mappings: Vec<ErrorMapping>,
}

impl OperationBuilder {
    /// Declare a named parameter of type `T`
    pub fn param<T: ?Sized>(mut self, name: impl Into<String>) -> Self {
        self.params.push(ParamSpec::named::<T>(name));
        self
    }

    /// Declare a positional-only parameter of type `T`
    pub fn positional<T: ?Sized>(mut self) -> Self {
        self.params.push(ParamSpec::positional::<T>());
        self
    }

    /// Declare a prebuilt parameter
    pub fn param_spec(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    /// Map a failure type to a fixed error code
    pub fn error_mapping(mut self, mapping: ErrorMapping) -> Self {
        self.error_mappings.push(mapping);
        self
    }

    /// Attach the handler and finish
    pub fn handler(self, handler: Box<dyn Handler>) -> Operation {
        Operation {
            name: self.name,
            params: self.params,
            error_mappings: self.error_mappings,
            handler: Arc::from(handler),
        }
    }
}
