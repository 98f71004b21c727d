//! Client behavior against a mock transport
//!
//! Covers request construction, result conversion, error responses, custom
//! exception resolvers and listeners.

mod common;

use common::{mock_error_response, mock_response, MockTransport};
use jrpc_client::{ClientBuilder, JrpcClient, RequestListener};
use jrpc_core::{Error, JsonRpcErrorData};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[tokio::test]
async fn test_invoke_returns_result() {
    let transport = MockTransport::returning(json!({"x": 1, "y": 2}));
    let client = JrpcClient::new(transport.clone());

    let point: Point = client.invoke("origin", ()).await.unwrap();
    assert_eq!(point, Point { x: 1, y: 2 });

    let request = transport.last_sent();
    assert_eq!(request["jsonrpc"], "2.0");
    assert_eq!(request["method"], "origin");
    assert!(request["id"].is_string());
    assert!(request.get("params").is_none());
}

#[tokio::test]
async fn test_error_response_is_raised() {
    let transport = MockTransport::replying(
        json!({"jsonrpc": "2.0", "error": {"code": 42, "message": "boom"}, "id": "1"}),
    );
    let client = JrpcClient::new(transport);

    let err = client.invoke::<_, Value>("explode", ()).await.unwrap_err();
    match err {
        Error::JsonRpc(data) => {
            assert_eq!(data.code, 42);
            assert_eq!(data.message, "boom");
        }
        other => panic!("expected a JSON-RPC error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_data_is_kept() {
    let transport = MockTransport::with_handler(|request| {
        Ok(json!({
            "jsonrpc": "2.0",
            "error": {"code": 0, "message": "bad", "data": "app::ParseFailure"},
            "id": request["id"]
        }))
    });
    let client = JrpcClient::new(transport);

    let err = client.invoke::<_, Value>("parse", ["x"]).await.unwrap_err();
    match err {
        Error::JsonRpc(data) => assert_eq!(data.data, Some(json!("app::ParseFailure"))),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_object_response_is_protocol_error() {
    let client = JrpcClient::new(MockTransport::replying(json!([1, 2, 3])));
    let result = client.invoke::<_, Value>("list", ()).await;
    assert!(matches!(result, Err(Error::Protocol(_))));
}

#[tokio::test]
async fn test_malformed_error_member_is_protocol_error() {
    for error in [json!("boom"), json!({"message": "no code"}), json!({"code": 3})] {
        let reply = json!({"jsonrpc": "2.0", "error": error, "id": "1"});
        let client = JrpcClient::new(MockTransport::replying(reply));

        let result = client.invoke::<_, Value>("fail", ()).await;
        assert!(matches!(result, Err(Error::Protocol(_))), "got {:?}", result);
    }
}

#[tokio::test]
async fn test_transport_error_is_returned() {
    let client = JrpcClient::new(MockTransport::with_handler(|_| Err(Error::ConnectionClosed)));
    let result = client.invoke::<_, Value>("anything", ()).await;
    assert!(matches!(result, Err(Error::ConnectionClosed)));
}

#[tokio::test]
async fn test_params_shapes() {
    let transport = MockTransport::returning(Value::Null);
    let client = JrpcClient::new(transport.clone());

    client.invoke::<_, Value>("add", (1, 2)).await.unwrap();
    assert_eq!(transport.last_sent()["params"], json!([1, 2]));

    client
        .invoke::<_, Value>("move", Point { x: 3, y: 4 })
        .await
        .unwrap();
    assert_eq!(transport.last_sent()["params"], json!({"x": 3, "y": 4}));

    client.invoke::<_, Value>("square", 9).await.unwrap();
    assert_eq!(transport.last_sent()["params"], json!([9]));

    client.invoke::<_, Value>("ping", Vec::<i32>::new()).await.unwrap();
    assert!(transport.last_sent().get("params").is_none());
}

#[tokio::test]
async fn test_fresh_id_per_call() {
    let transport = MockTransport::returning(json!(true));
    let client = JrpcClient::new(transport.clone());

    client.invoke::<_, bool>("a", ()).await.unwrap();
    client.invoke::<_, bool>("b", ()).await.unwrap();

    let sent = transport.sent();
    assert_ne!(sent[0]["id"], sent[1]["id"]);
}

#[tokio::test]
async fn test_notify_omits_id() {
    let transport = MockTransport::with_handler(|_| panic!("notifications are not calls"));
    let client = JrpcClient::new(transport.clone());

    client.notify("log", ["started"]).await.unwrap();

    let notification = transport.last_sent();
    assert!(notification.get("id").is_none());
    assert_eq!(notification["method"], "log");
    assert_eq!(notification["params"], json!(["started"]));
}

#[derive(Debug, thiserror::Error)]
#[error("insufficient funds: {0}")]
struct InsufficientFunds(String);

#[tokio::test]
async fn test_custom_exception_resolver() {
    let transport =
        MockTransport::with_handler(|request| Ok(mock_error_response(&request["id"], 4001, "need 50")));

    let client = ClientBuilder::new("http://unused/")
        .exception_resolver(|error: &JsonRpcErrorData| match error.code {
            4001 => Error::Remote(Arc::new(InsufficientFunds(error.message.clone()))),
            _ => Error::JsonRpc(error.clone()),
        })
        .build_with_transport(transport)
        .unwrap();

    let err = client.invoke::<_, Value>("withdraw", (100,)).await.unwrap_err();
    match err {
        Error::Remote(failure) => {
            assert!(failure.downcast_ref::<InsufficientFunds>().is_some());
            assert_eq!(failure.to_string(), "insufficient funds: need 50");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

struct AuthListener;

impl RequestListener for AuthListener {
    fn on_before_request(&self, request: &mut Value) {
        request["auth"] = json!("token");
    }

    fn on_before_response(&self, response: &mut Value) {
        // Rewrite the result to show the hook runs before interpretation
        if response["result"] == json!("raw") {
            response["result"] = json!("seen");
        }
    }
}

#[tokio::test]
async fn test_listener_sees_both_documents() {
    let transport = MockTransport::with_handler(|request| {
        assert_eq!(request["auth"], "token");
        Ok(mock_response(&request["id"], json!("raw")))
    });

    let client = ClientBuilder::new("http://unused/")
        .listener(AuthListener)
        .build_with_transport(transport)
        .unwrap();

    let result: String = client.invoke("whoami", ()).await.unwrap();
    assert_eq!(result, "seen");
}
