//! Overload resolution and argument binding
//!
//! Given the candidates registered under a method name and the request's
//! params, [`resolve`] picks one operation and binds the params to its
//! declared parameters.
//!
//! # Arity
//!
//! A candidate with `declared` parameters is compatible with `supplied`
//! values when the counts are equal, or when `extra_params_allowed` and
//! `declared < supplied`, or when `fewer_params_allowed` and
//! `declared > supplied`. No compatible candidate means "method not found".
//!
//! # Positional Params
//!
//! Among compatible candidates, those whose declared count is closest to the
//! supplied count win. A unique winner binds arguments by index: extra values
//! are dropped, missing ones become `null`. Several winners make the call
//! ambiguous, which is reported as invalid params.
//!
//! # Named Params
//!
//! The first compatible candidate, in registration order, whose parameters
//! all have names and whose names are all present in the params object wins.
//! With `fewer_params_allowed`, absent names bind `null` instead of
//! disqualifying the candidate.

use crate::config::ServerConfig;
use crate::operation::Operation;
use jrpc_core::{Error, Params, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

/// An operation chosen for a request, with its bound arguments
#[derive(Debug)]
pub struct BoundCall {
    pub operation: Arc<Operation>,

    /// One value per declared parameter, in declaration order
    pub args: Vec<Value>,
}

/// Whether an operation declaring `declared` parameters accepts `supplied` values
pub fn arity_compatible(declared: usize, supplied: usize, config: &ServerConfig) -> bool {
    declared == supplied
        || (config.extra_params_allowed && declared < supplied)
        || (config.fewer_params_allowed && declared > supplied)
}

/// Choose an operation among `candidates` and bind `params` to it
///
/// # Errors
///
/// - `Error::MethodNotFound` when no candidate has a compatible arity
///   (including when there are no candidates at all)
/// - `Error::AmbiguousMethod` when several positional candidates tie
/// - `Error::InvalidParams` when no candidate binds the named params
pub fn resolve(
    method: &str,
    candidates: &[Arc<Operation>],
    params: Option<&Params>,
    config: &ServerConfig,
) -> Result<BoundCall> {
    let supplied = params.map_or(0, Params::len);

    let compatible: Vec<&Arc<Operation>> = candidates
        .iter()
        .filter(|op| arity_compatible(op.arity(), supplied, config))
        .collect();

    if compatible.is_empty() {
        return Err(Error::MethodNotFound(method.to_string()));
    }

    match params {
        Some(Params::Named(values)) => resolve_named(method, &compatible, values, config),
        Some(Params::Positional(values)) => resolve_positional(method, &compatible, values),
        None => resolve_positional(method, &compatible, &[]),
    }
}

fn resolve_positional(
    method: &str,
    compatible: &[&Arc<Operation>],
    values: &[Value],
) -> Result<BoundCall> {
    let distance = |op: &Operation| op.arity().abs_diff(values.len());

    let closest = compatible
        .iter()
        .map(|op| distance(op))
        .min()
        .unwrap_or_default();

    let best: Vec<&Arc<Operation>> = compatible
        .iter()
        .copied()
        .filter(|op| distance(op) == closest)
        .collect();

    match best.as_slice() {
        [operation] => Ok(BoundCall {
            operation: Arc::clone(operation),
            args: bind_positional(operation, values),
        }),
        _ => Err(Error::AmbiguousMethod {
            method: method.to_string(),
            arity: values.len(),
            candidates: best.len(),
        }),
    }
}

fn bind_positional(operation: &Operation, values: &[Value]) -> Vec<Value> {
    let mut args: Vec<Value> = values.iter().take(operation.arity()).cloned().collect();
    args.resize(operation.arity(), Value::Null);
    args
}

fn resolve_named(
    method: &str,
    compatible: &[&Arc<Operation>],
    values: &Map<String, Value>,
    config: &ServerConfig,
) -> Result<BoundCall> {
    compatible
        .iter()
        .find_map(|op| {
            bind_named(op, values, config.fewer_params_allowed).map(|args| BoundCall {
                operation: Arc::clone(op),
                args,
            })
        })
        .ok_or_else(|| {
            let mut supplied: Vec<&str> = values.keys().map(String::as_str).collect();
            supplied.sort_unstable();
            Error::InvalidParams(format!(
                "No overload of {} accepts the named params [{}]",
                method,
                supplied.join(", ")
            ))
        })
}

fn bind_named(
    operation: &Operation,
    values: &Map<String, Value>,
    fewer_params_allowed: bool,
) -> Option<Vec<Value>> {
    operation
        .param_names()?
        .into_iter()
        .map(|name| match values.get(name) {
            Some(value) => Some(value.clone()),
            None if fewer_params_allowed => Some(Value::Null),
            None => None,
        })
        .collect()
}
