//! Request construction
//!
//! Each call gets a fresh string id drawn from a random non-negative 63-bit
//! integer. The client performs one round trip per call and never has two
//! requests in flight on the same exchange, so the id only has to tell this
//! response apart from a stale or misrouted one.

use jrpc_core::{Id, JsonRpcRequest, Params, Result};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;

/// Generate a new request id
pub fn next_id() -> Id {
    let n: u64 = rand::thread_rng().gen_range(0..=i64::MAX as u64);
    Id::String(n.to_string())
}

/// Serialize call arguments into request params
///
/// `null` and empty arrays leave the member out, a scalar becomes a single
/// positional argument.
pub(crate) fn params_of<P: Serialize>(params: P) -> Result<Option<Params>> {
    let value = serde_json::to_value(params)?;
    Ok(Params::from_value(value))
}

/// Build the request document for a call
pub(crate) fn build_request<P: Serialize>(method: &str, params: P, id: Id) -> Result<Value> {
    let request = JsonRpcRequest::new(method, params_of(params)?, id);
    to_document(&request)
}

/// Build the document for a notification
pub(crate) fn build_notification<P: Serialize>(method: &str, params: P) -> Result<Value> {
    let notification = JsonRpcRequest::notification(method, params_of(params)?);
    to_document(&notification)
}

fn to_document(request: &JsonRpcRequest) -> Result<Value> {
    Ok(serde_json::to_value(request)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ids_are_non_negative_strings() {
        for _ in 0..100 {
            match next_id() {
                Id::String(s) => assert!(s.parse::<i64>().unwrap() >= 0),
                other => panic!("unexpected id: {:?}", other),
            }
        }
    }

    #[test]
    fn test_ids_differ() {
        assert_ne!(next_id(), next_id());
    }

    #[test]
    fn test_build_request_shapes_params() {
        let positional = build_request("add", (1, 2), Id::from("1")).unwrap();
        assert_eq!(
            positional,
            json!({"jsonrpc": "2.0", "method": "add", "params": [1, 2], "id": "1"})
        );

        let named = build_request("greet", json!({"name": "ada"}), Id::from("2")).unwrap();
        assert_eq!(named["params"], json!({"name": "ada"}));

        let scalar = build_request("square", 4, Id::from("3")).unwrap();
        assert_eq!(scalar["params"], json!([4]));

        let empty = build_request("ping", (), Id::from("4")).unwrap();
        assert!(empty.get("params").is_none());
    }

    #[test]
    fn test_build_notification_has_no_id() {
        let notification = build_notification("log", ["hello"]).unwrap();
        assert!(notification.get("id").is_none());
        assert_eq!(notification["params"], json!(["hello"]));
    }
}
