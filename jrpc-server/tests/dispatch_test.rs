//! Dispatcher behavior over byte streams: arity rules, notifications, batches

use jrpc_server::{from_typed_fn, Failure, JrpcServer, Operation, ServerConfig};
use serde_json::{json, Value};

fn test_method() -> Operation {
    Operation::builder("testMethod")
        .param::<String>("param1")
        .handler(from_typed_fn(|(_param1,): (String,)| async move {
            Ok::<_, Failure>("success")
        }))
}

fn server(config: ServerConfig) -> JrpcServer {
    JrpcServer::builder()
        .operation(test_method())
        .config(config)
        .build()
        .unwrap()
}

fn allow_extra() -> ServerConfig {
    ServerConfig::default().with_extra_params_allowed(true)
}

/// Feed one document through `handle` and return what was written
async fn exchange(server: &JrpcServer, request: &str) -> Vec<u8> {
    let mut reader = request.as_bytes();
    let mut output = Vec::new();
    server.handle(&mut reader, &mut output).await.unwrap();
    output
}

async fn call(server: &JrpcServer, request: Value) -> Value {
    let output = exchange(server, &request.to_string()).await;
    serde_json::from_slice(&output).unwrap()
}

fn request(params: Value) -> Value {
    json!({"jsonrpc": "2.0", "id": "1", "method": "testMethod", "params": params})
}

#[tokio::test]
async fn test_notification_writes_nothing() {
    let notification = json!({"jsonrpc": "2.0", "method": "testMethod", "params": ["x"]});
    let output = exchange(&server(ServerConfig::default()), &notification.to_string()).await;
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_too_few_params() {
    let response = call(&server(ServerConfig::default()), request(json!([]))).await;
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["id"], "1");
}

#[tokio::test]
async fn test_exact_params() {
    let response = call(&server(ServerConfig::default()), request(json!(["Test"]))).await;
    assert_eq!(response, json!({"jsonrpc": "2.0", "result": "success", "id": "1"}));
}

#[tokio::test]
async fn test_extra_params() {
    let response = call(&server(ServerConfig::default()), request(json!(["Test", "x"]))).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_too_few_params_named() {
    let response = call(&server(ServerConfig::default()), request(json!({}))).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_exact_params_named() {
    let response =
        call(&server(ServerConfig::default()), request(json!({"param1": "Test"}))).await;
    assert_eq!(response["result"], "success");
}

#[tokio::test]
async fn test_extra_params_named() {
    let params = json!({"param1": "Test", "param2": "x"});
    let response = call(&server(ServerConfig::default()), request(params)).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_too_few_params_allow_extra() {
    let response = call(&server(allow_extra()), request(json!([]))).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_exact_params_allow_extra() {
    let response = call(&server(allow_extra()), request(json!(["Test"]))).await;
    assert_eq!(response["result"], "success");
}

#[tokio::test]
async fn test_extra_params_allow_extra() {
    let response = call(&server(allow_extra()), request(json!(["Test", "x"]))).await;
    assert_eq!(response["result"], "success");
}

#[tokio::test]
async fn test_too_few_params_named_allow_extra() {
    let response = call(&server(allow_extra()), request(json!({}))).await;
    assert_eq!(response["error"]["code"], -32601);
}

#[tokio::test]
async fn test_exact_params_named_allow_extra() {
    let response = call(&server(allow_extra()), request(json!({"param1": "Test"}))).await;
    assert_eq!(response["result"], "success");
}

#[tokio::test]
async fn test_extra_params_named_allow_extra() {
    let params = json!({"param1": "Test", "param2": "x"});
    let response = call(&server(allow_extra()), request(params)).await;
    assert_eq!(response["result"], "success");
}

#[tokio::test]
async fn test_too_few_params_allow_fewer_binds_null() {
    let server = JrpcServer::builder()
        .operation(
            Operation::builder("greet")
                .param::<Option<String>>("name")
                .handler(from_typed_fn(|(name,): (Option<String>,)| async move {
                    Ok::<_, Failure>(format!("hello {}", name.as_deref().unwrap_or("nobody")))
                })),
        )
        .fewer_params_allowed(true)
        .build()
        .unwrap();

    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": "1", "method": "greet", "params": []}),
    )
    .await;
    assert_eq!(response["result"], "hello nobody");
}

#[tokio::test]
async fn test_unknown_method() {
    let response = call(
        &server(ServerConfig::default()),
        json!({"jsonrpc": "2.0", "id": 3, "method": "nope"}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["id"], 3);
}

#[tokio::test]
async fn test_malformed_json_is_parse_error() {
    let output = exchange(&server(ServerConfig::default()), "{\"jsonrpc\": \"2.0\",").await;
    let response: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], Value::Null);
}

#[tokio::test]
async fn test_invalid_request_answered_even_without_id() {
    let response = call(
        &server(ServerConfig::default()),
        json!({"jsonrpc": "1.0", "method": "testMethod", "params": ["x"]}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], Value::Null);
}

#[tokio::test]
async fn test_scalar_params_rejected() {
    let response = call(&server(ServerConfig::default()), request(json!("Test"))).await;
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], "1");
}

#[tokio::test]
async fn test_batch_over_stream() {
    let batch = json!([
        request(json!(["a"])),
        {"jsonrpc": "2.0", "method": "testMethod", "params": ["b"]},
        {"jsonrpc": "2.0", "id": "3", "method": "testMethod", "params": []}
    ]);
    let response = call(&server(ServerConfig::default()), batch).await;

    let items = response.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["result"], "success");
    assert_eq!(items[1]["id"], "3");
    assert_eq!(items[1]["error"]["code"], -32601);
}

#[tokio::test]
async fn test_notification_batch_writes_nothing() {
    let batch = json!([
        {"jsonrpc": "2.0", "method": "testMethod", "params": ["a"]},
        {"jsonrpc": "2.0", "method": "testMethod", "params": ["b"]}
    ]);
    let output = exchange(&server(ServerConfig::default()), &batch.to_string()).await;
    assert!(output.is_empty());
}

#[tokio::test]
async fn test_rethrow_after_writing_response() {
    let server = JrpcServer::builder()
        .operation(Operation::builder("explode").handler(from_typed_fn(|(): ()| async {
            Err::<Value, _>(Failure::msg("kaboom"))
        })))
        .rethrow_failures(true)
        .build()
        .unwrap();

    let request = json!({"jsonrpc": "2.0", "id": "9", "method": "explode"}).to_string();
    let mut reader = request.as_bytes();
    let mut output = Vec::new();

    let err = server.handle(&mut reader, &mut output).await.unwrap_err();
    assert!(matches!(err, jrpc_core::Error::Handler { ref method, .. } if method == "explode"));

    let response: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(response["error"]["message"], "kaboom");
    assert_eq!(response["id"], "9");
}

#[tokio::test]
async fn test_rethrow_without_stream_still_answers() {
    let server = JrpcServer::builder()
        .operation(Operation::builder("explode").handler(from_typed_fn(|(): ()| async {
            Err::<Value, _>(Failure::msg("kaboom"))
        })))
        .rethrow_failures(true)
        .build()
        .unwrap();

    let response = server
        .handle_str(r#"{"jsonrpc": "2.0", "id": "9", "method": "explode"}"#)
        .await
        .unwrap();
    let response: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(response["error"]["message"], "kaboom");
}

#[tokio::test]
async fn test_oversized_document_is_parse_error() {
    let config = ServerConfig::default().with_max_document_size(128);
    let server = server(config);
    let big = request(json!(["x".repeat(200)])).to_string();

    let mut reader = big.as_bytes();
    let mut output = Vec::new();
    server.handle(&mut reader, &mut output).await.unwrap();
    let response: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(response["error"]["code"], -32700);
    assert_eq!(response["id"], Value::Null);

    let response: Value = serde_json::from_str(&server.handle_str(&big).await.unwrap()).unwrap();
    assert_eq!(response["error"]["code"], -32700);

    let small = call(&server, request(json!(["ok"]))).await;
    assert_eq!(small["result"], "success");
}

#[tokio::test]
async fn test_overloads_by_arity() {
    let server = JrpcServer::builder()
        .operation(
            Operation::builder("sum")
                .param::<i64>("a")
                .handler(from_typed_fn(|(a,): (i64,)| async move { Ok::<_, Failure>(a) })),
        )
        .operation(
            Operation::builder("sum")
                .param::<i64>("a")
                .param::<i64>("b")
                .handler(from_typed_fn(|(a, b): (i64, i64)| async move {
                    Ok::<_, Failure>(a + b)
                })),
        )
        .build()
        .unwrap();

    let one = json!({"jsonrpc": "2.0", "id": 1, "method": "sum", "params": [4]});
    let two = json!({"jsonrpc": "2.0", "id": 2, "method": "sum", "params": {"a": 4, "b": 5}});
    assert_eq!(call(&server, one).await["result"], 4);
    assert_eq!(call(&server, two).await["result"], 9);
}

#[tokio::test]
async fn test_ambiguous_overloads_are_invalid_params() {
    let pick = |name: &'static str| {
        Operation::builder("pick")
            .param::<Value>("x")
            .handler(from_typed_fn(move |(_x,): (Value,)| async move {
                Ok::<_, Failure>(name)
            }))
    };
    let server = JrpcServer::builder()
        .operation(pick("first"))
        .operation(pick("second"))
        .build()
        .unwrap();

    let response = call(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "pick", "params": [1]}),
    )
    .await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_conversion_failure_is_invalid_params() {
    let response = call(&server(ServerConfig::default()), request(json!([42]))).await;
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn test_concurrent_dispatch() {
    let server = server(ServerConfig::default());
    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let server = server.clone();
            tokio::spawn(async move {
                server
                    .handle_value(json!({
                        "jsonrpc": "2.0", "id": i, "method": "testMethod", "params": ["x"]
                    }))
                    .await
            })
        })
        .collect();

    for (i, task) in tasks.into_iter().enumerate() {
        let response = task.await.unwrap().unwrap();
        assert_eq!(response["id"], i);
        assert_eq!(response["result"], "success");
    }
}
