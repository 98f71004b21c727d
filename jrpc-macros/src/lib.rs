//! Procedural macros for jrpc
//!
//! # Available Macros
//!
//! ## `#[operation]` - Register an async fn as a JSON-RPC operation
//!
//! Turns an `async fn` into a factory returning a `jrpc_server::Operation`.
//! The generated operation:
//! - Is named after the function (or `name = ".."`)
//! - Declares one parameter per argument, named after the argument, so both
//!   positional and named calls bind
//! - Converts arguments from JSON and the return value back to JSON
//! - Carries any `error(..)` mappings
//!
//! # Examples
//!
//! ```ignore
//! use jrpc_server::{Failure, JrpcServer};
//! use jrpc_macros::operation;
//!
//! #[operation]
//! async fn add(a: i64, b: i64) -> Result<i64, Failure> {
//!     Ok(a + b)
//! }
//!
//! #[operation(name = "user.rename", error(kind = NotFound, code = 404))]
//! async fn rename(id: u64, name: String) -> Result<(), Failure> {
//!     store::rename(id, &name)?;
//!     Ok(())
//! }
//!
//! let server = JrpcServer::builder()
//!     .operation(add())
//!     .operation(rename())
//!     .build()?;
//! ```

mod operation;

use proc_macro::TokenStream;
use syn::parse_macro_input;

/// Attribute macro declaring a JSON-RPC operation
///
/// # Options
///
/// - `name = "method.name"`: method name on the wire (default: the function
///   name, with any `r#` prefix removed)
/// - `positional`: declare parameters without names, so only positional
///   calls bind
/// - `error(kind = Type, code = 1234, message = "..", data = "..")`: map
///   failures of `Type` to an error object; `message` and `data` are optional
///   and may be repeated for several failure types
///
/// # Requirements
///
/// - The function must be `async`, non-generic and free (no `self`)
/// - Every argument must be a plain identifier whose type implements
///   `serde::Deserialize`
/// - The return type must be `Result<T, E>` with `T: Serialize` and
///   `E: Into<jrpc_server::Failure>`
///
/// # Generated Code
///
/// ```ignore
/// #[operation]
/// async fn add(a: i64, b: i64) -> Result<i64, Failure> { Ok(a + b) }
/// ```
///
/// expands to approximately:
///
/// ```ignore
/// fn add() -> jrpc_server::Operation {
///     async fn __operation_body(a: i64, b: i64) -> Result<i64, Failure> { Ok(a + b) }
///
///     jrpc_server::Operation::builder("add")
///         .param::<i64>("a")
///         .param::<i64>("b")
///         .handler(jrpc_server::from_typed_fn(|(a0, a1): (i64, i64)| __operation_body(a0, a1)))
/// }
/// ```
#[proc_macro_attribute]
pub fn operation(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = operation::OperationArgs::default();
    let parser = syn::meta::parser(|meta| args.parse(meta));
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as syn::ItemFn);

    operation::expand(args, input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
