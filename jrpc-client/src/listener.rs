//! Hooks around each round trip
//!
//! A [`RequestListener`] sees the outgoing request document just before it is
//! handed to the transport, and the response document just after it arrives,
//! before the client inspects it. Listeners may edit either document (to add
//! tracing fields, say), but they never decide how the response is handled.

use serde_json::Value;

/// Observes (and may edit) request and response documents
///
/// Both methods default to doing nothing, so implementors override only what
/// they need.
pub trait RequestListener: Send + Sync {
    fn on_before_request(&self, _request: &mut Value) {}

    fn on_before_response(&self, _response: &mut Value) {}
}

/// Logs every document at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl RequestListener for LoggingListener {
    fn on_before_request(&self, request: &mut Value) {
        tracing::debug!(request = %request, "Sending JSON-RPC request");
    }

    fn on_before_response(&self, response: &mut Value) {
        tracing::debug!(response = %response, "Received JSON-RPC response");
    }
}
