//! HTTP binding
//!
//! Serves a [`JrpcServer`] over HTTP with axum:
//!
//! - `POST /`: the body is one JSON-RPC document
//! - `GET /?method=..&id=..&params=..`: the legacy query form, where `params`
//!   is the URL-encoded JSON text, base64-encoded
//!
//! Responses are `200 OK` with content type `application/json-rpc`; the body
//! is empty when the request produced no response (notifications).
//!
//! # Examples
//!
//! ```rust,no_run
//! use jrpc_server::{http, JrpcServer};
//! use tokio::net::TcpListener;
//!
//! # async fn example(server: JrpcServer) -> jrpc_core::Result<()> {
//! let listener = TcpListener::bind("127.0.0.1:8080").await?;
//! http::serve(listener, server, async {
//!     tokio::signal::ctrl_c().await.ok();
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::dispatcher::{parse_error_response, JrpcServer};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use jrpc_core::{codec, Result, JSONRPC_CONTENT_TYPE};
use serde::Deserialize;
use std::future::Future;
use tokio::net::TcpListener;

/// Query parameters of the legacy GET form
#[derive(Debug, Deserialize)]
struct GetForm {
    method: Option<String>,
    id: Option<String>,
    params: Option<String>,
}

/// Build an axum router answering JSON-RPC on `/`
pub fn router(server: JrpcServer) -> Router {
    Router::new()
        .route("/", post(handle_post).get(handle_get))
        .with_state(server)
}

/// Serve `server` on `listener` until `shutdown` completes
pub async fn serve<F>(listener: TcpListener, server: JrpcServer, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(addr = %addr, "HTTP server listening");
    }

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn handle_post(State(server): State<JrpcServer>, body: Bytes) -> Response {
    tracing::debug!(bytes = body.len(), "HTTP POST request");
    respond(server.handle_bytes(&body).await)
}

async fn handle_get(State(server): State<JrpcServer>, Query(form): Query<GetForm>) -> Response {
    tracing::debug!(method = ?form.method, id = ?form.id, "HTTP GET request");

    let request = codec::decode_get_request(
        form.method.as_deref(),
        form.id.as_deref(),
        form.params.as_deref(),
    );

    let reply = match request {
        Ok(request) => server
            .handle_value(request)
            .await
            .map(|response| response.to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Malformed GET request");
            Some(parse_error_response().to_string())
        }
    };

    respond(reply)
}

fn respond(body: Option<String>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, JSONRPC_CONTENT_TYPE)],
        body.unwrap_or_default(),
    )
        .into_response()
}
