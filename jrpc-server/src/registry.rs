//! Method registry
//!
//! The registry holds the operations of one handler surface in registration
//! order and answers "which operations are called `name`?". Lookups go through
//! a per-name cache that fills lazily on first use, so repeated requests for a
//! method do not rescan the table.
//!
//! # Thread Safety
//!
//! The registration table never changes after construction. The cache is
//! guarded by a `RwLock`; concurrent first lookups of the same name may both
//! compute the candidate list, and whichever is stored first is returned to
//! both. Lookups therefore always agree with the table.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_server::{from_fn, Failure, MethodRegistry, Operation};
//! use serde_json::Value;
//!
//! let noop = || from_fn(|_args: Vec<Value>| async { Ok::<_, Failure>(Value::Null) });
//!
//! let registry = MethodRegistry::builder()
//!     .operation(Operation::builder("add").param::<i64>("a").param::<i64>("b").handler(noop()))
//!     .operation(Operation::builder("add").param::<i64>("a").handler(noop()))
//!     .build();
//!
//! assert_eq!(registry.lookup("add").len(), 2);
//! assert!(registry.lookup("sub").is_empty());
//! ```

use crate::operation::Operation;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Candidate operations sharing one name, in registration order
pub type Candidates = Arc<[Arc<Operation>]>;

/// Registry of the operations a server can dispatch to
#[derive(Debug)]
pub struct MethodRegistry {
    operations: Vec<Arc<Operation>>,
    by_name: RwLock<HashMap<String, Candidates>>,
}

impl MethodRegistry {
    pub fn new(operations: Vec<Operation>) -> Self {
        Self {
            operations: operations.into_iter().map(Arc::new).collect(),
            by_name: RwLock::new(HashMap::new()),
        }
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All operations named `name`, in registration order
    ///
    /// Unknown names yield an empty list and are not cached.
    pub fn lookup(&self, name: &str) -> Candidates {
        {
            let cache = self.by_name.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(candidates) = cache.get(name) {
                return Arc::clone(candidates);
            }
        }

        let candidates: Candidates = self
            .operations
            .iter()
            .filter(|op| op.name() == name)
            .cloned()
            .collect();

        if candidates.is_empty() {
            return candidates;
        }

        let mut cache = self.by_name.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(cache.entry(name.to_string()).or_insert(candidates))
    }

    /// Check if any operation has this name
    pub fn has_method(&self, name: &str) -> bool {
        self.operations.iter().any(|op| op.name() == name)
    }

    /// Distinct method names, sorted
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.operations.iter().map(|op| op.name().to_string()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Every registered operation, in registration order
    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl Default for MethodRegistry {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Builder for constructing a registry
pub struct RegistryBuilder {
    operations: Vec<Operation>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
        }
    }

    /// Add an operation; overloads of one name keep their relative order
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations.extend(operations);
        self
    }

    pub fn build(self) -> MethodRegistry {
        MethodRegistry::new(self.operations)
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
