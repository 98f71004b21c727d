//! Calculator service over TCP and HTTP
//!
//! Serves the same operations on `tcp://127.0.0.1:10420` and
//! `http://127.0.0.1:8080/`.

use jrpc::server::{from_typed_fn, http, Failure, Operation};
use jrpc::{operation, JrpcServer, StreamServer};
use serde_json::Value;
use tokio::net::TcpListener;

#[derive(Debug, thiserror::Error)]
#[error("division by zero")]
struct DivisionByZero;

#[operation]
async fn add(a: i64, b: i64) -> Result<i64, Failure> {
    Ok(a + b)
}

/// Three-argument overload of `add`
#[operation(name = "add")]
async fn add3(a: i64, b: i64, c: i64) -> Result<i64, Failure> {
    Ok(a + b + c)
}

#[operation(error(kind = DivisionByZero, code = 1001, message = "Cannot divide by zero"))]
async fn divide(dividend: f64, divisor: f64) -> Result<f64, DivisionByZero> {
    if divisor == 0.0 {
        return Err(DivisionByZero);
    }
    Ok(dividend / divisor)
}

#[operation]
async fn greet(name: Option<String>) -> Result<String, Failure> {
    Ok(format!("Hello, {}!", name.as_deref().unwrap_or("stranger")))
}

fn echo() -> Operation {
    Operation::builder("echo")
        .param::<Value>("value")
        .handler(from_typed_fn(|(value,): (Value,)| async move {
            Ok::<_, Failure>(value)
        }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let server = JrpcServer::builder()
        .operation(add())
        .operation(add3())
        .operation(divide())
        .operation(greet())
        .operation(echo())
        .fewer_params_allowed(true)
        .build()?;

    let listener = TcpListener::bind("127.0.0.1:8080").await?;
    let http_server = server.clone();
    tokio::spawn(async move {
        let shutdown = async {
            tokio::signal::ctrl_c().await.ok();
        };
        if let Err(e) = http::serve(listener, http_server, shutdown).await {
            eprintln!("HTTP server failed: {}", e);
        }
    });

    let stream_server = StreamServer::builder(server)
        .bind_str("127.0.0.1:10420")?
        .build()
        .await?;

    println!("Calculator listening on tcp://127.0.0.1:10420 and http://127.0.0.1:8080/");
    println!("  - add(a, b), add(a, b, c)");
    println!("  - divide(dividend, divisor)");
    println!("  - greet(name?)");
    println!("  - echo(value)");
    println!("\nPress Ctrl+C to stop");

    let shutdown = stream_server.shutdown_handle();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        shutdown.shutdown();
    });

    stream_server.run().await?;
    Ok(())
}
