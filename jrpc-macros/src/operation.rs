//! `#[operation]` implementation
//!
//! Parses the attributed `async fn`, keeps its body in an inner function and
//! emits a factory that registers it:
//!
//! ```ignore
//! #[operation(error(kind = ParseIntError, code = 1234))]
//! async fn parse(text: String) -> Result<i64, Failure> { ... }
//! ```
//!
//! becomes
//!
//! ```ignore
//! fn parse() -> ::jrpc_server::Operation {
//!     async fn __operation_body(text: String) -> Result<i64, Failure> { ... }
//!
//!     ::jrpc_server::Operation::builder("parse")
//!         .param::<String>("text")
//!         .error_mapping(::jrpc_server::ErrorMapping::new::<ParseIntError>(1234))
//!         .handler(::jrpc_server::from_typed_fn(|(__arg0,): (String,)| {
//!             __operation_body(__arg0)
//!         }))
//! }
//! ```

use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{Expr, FnArg, ItemFn, LitStr, Pat, Type};

/// Options given inside `#[operation(...)]`
#[derive(Default)]
pub struct OperationArgs {
    name: Option<LitStr>,
    positional: bool,
    errors: Vec<ErrorArgs>,
}

struct ErrorArgs {
    kind: Type,
    code: Expr,
    message: Option<LitStr>,
    data: Option<LitStr>,
}

impl OperationArgs {
    pub fn parse(&mut self, meta: ParseNestedMeta) -> syn::Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("positional") {
            self.positional = true;
            Ok(())
        } else if meta.path.is_ident("error") {
            self.errors.push(ErrorArgs::parse(&meta)?);
            Ok(())
        } else {
            Err(meta.error("expected `name = \"..\"`, `positional` or `error(..)`"))
        }
    }
}

impl ErrorArgs {
    fn parse(meta: &ParseNestedMeta) -> syn::Result<Self> {
        let mut kind = None;
        let mut code = None;
        let mut message = None;
        let mut data = None;

        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("kind") {
                kind = Some(inner.value()?.parse::<Type>()?);
            } else if inner.path.is_ident("code") {
                code = Some(inner.value()?.parse::<Expr>()?);
            } else if inner.path.is_ident("message") {
                message = Some(inner.value()?.parse::<LitStr>()?);
            } else if inner.path.is_ident("data") {
                data = Some(inner.value()?.parse::<LitStr>()?);
            } else {
                return Err(inner.error("expected `kind`, `code`, `message` or `data`"));
            }
            Ok(())
        })?;

        match (kind, code) {
            (Some(kind), Some(code)) => Ok(Self {
                kind,
                code,
                message,
                data,
            }),
            _ => Err(meta.error("error mappings need both `kind = Type` and `code = ..`")),
        }
    }

    fn builder_call(&self) -> TokenStream {
        let kind = &self.kind;
        let code = &self.code;
        let message = self
            .message
            .as_ref()
            .map(|m| quote! { .with_message(#m) });
        let data = self.data.as_ref().map(|d| quote! { .with_data(#d) });

        quote! {
            .error_mapping(::jrpc_server::ErrorMapping::new::<#kind>(#code) #message #data)
        }
    }
}

pub fn expand(args: OperationArgs, input: ItemFn) -> syn::Result<TokenStream> {
    let sig = &input.sig;

    if sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            sig.fn_token,
            "#[operation] requires an async fn",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "#[operation] functions cannot be generic",
        ));
    }

    let mut types = Vec::new();
    let mut names = Vec::new();
    for input in &sig.inputs {
        match input {
            FnArg::Receiver(receiver) => {
                return Err(syn::Error::new_spanned(
                    receiver,
                    "#[operation] works on free functions, not methods",
                ));
            }
            FnArg::Typed(pat_type) => match &*pat_type.pat {
                Pat::Ident(pat_ident) => {
                    types.push((*pat_type.ty).clone());
                    names.push(pat_ident.ident.unraw().to_string());
                }
                other => {
                    return Err(syn::Error::new_spanned(
                        other,
                        "#[operation] arguments must be plain identifiers",
                    ));
                }
            },
        }
    }

    let fn_name = &sig.ident;
    let fn_vis = &input.vis;
    let fn_attrs = &input.attrs;
    let fn_block = &input.block;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let method = args
        .name
        .unwrap_or_else(|| LitStr::new(&fn_name.unraw().to_string(), Span::call_site()));

    let params = types.iter().zip(&names).map(|(ty, name)| {
        if args.positional {
            quote! { .positional::<#ty>() }
        } else {
            quote! { .param::<#ty>(#name) }
        }
    });
    let mappings = args.errors.iter().map(ErrorArgs::builder_call);

    let bindings: Vec<_> = (0..types.len()).map(|i| format_ident!("__arg{}", i)).collect();

    Ok(quote! {
        #(#fn_attrs)*
        #fn_vis fn #fn_name() -> ::jrpc_server::Operation {
            async fn __operation_body(#inputs) #output #fn_block

            ::jrpc_server::Operation::builder(#method)
                #(#params)*
                #(#mappings)*
                .handler(::jrpc_server::from_typed_fn(
                    |(#(#bindings,)*): (#(#types,)*)| __operation_body(#(#bindings),*)
                ))
        }
    })
}
