//! Batch processing
//!
//! A batch is a JSON array of request objects. Elements are processed in
//! order, one at a time, and each non-notification element contributes one
//! response to the reply array. A batch made only of notifications gets no
//! reply at all.
//!
//! # Rejected Batches
//!
//! These are answered with a single invalid-request error (not an array):
//!
//! - An empty array
//! - An array longer than `ServerConfig::max_batch_size`
//!
//! An element that is not an object gets its own invalid-request response
//! with a null id; the rest of the batch is still processed.

use crate::dispatcher::{Dispatch, JrpcServer, RequestOutcome};
use jrpc_core::{Error, Id, JsonRpcErrorData, JsonRpcResponse};
use serde_json::Value;

#[tracing::instrument(skip(server, items), fields(batch_size = items.len()))]
pub(crate) async fn process_batch(server: &JrpcServer, items: Vec<Value>) -> Dispatch {
    if items.is_empty() {
        tracing::warn!("Empty batch");
        return Dispatch::reply(JsonRpcResponse::error(
            JsonRpcErrorData::invalid_request("Empty batch"),
            Id::Null,
        ));
    }

    if let Some(limit) = server.config().max_batch_size {
        if items.len() > limit {
            tracing::warn!(batch_size = items.len(), max_size = limit, "Batch size exceeded");
            let error = Error::BatchSizeExceeded {
                limit,
                actual: items.len(),
            };
            return Dispatch::reply(JsonRpcResponse::error(error.to_error_data(), Id::Null));
        }
    }

    if let Some(m) = server.metrics() {
        m.record_batch(items.len() as u64);
    }

    let mut responses = Vec::with_capacity(items.len());
    let mut first_failure = None;

    for item in items {
        let outcome = match item {
            Value::Object(request) => server.process_request(request).await,
            _ => RequestOutcome::reply(JsonRpcResponse::error(
                JsonRpcErrorData::invalid_request("Batch element must be an object"),
                Id::Null,
            )),
        };

        if let Some(response) = outcome.response {
            responses.push(response.into_value());
        }
        if first_failure.is_none() {
            first_failure = outcome.failure;
        }
    }

    tracing::debug!(response_count = responses.len(), "Batch processing completed");

    Dispatch {
        response: (!responses.is_empty()).then(|| Value::Array(responses)),
        failure: first_failure,
    }
}
