//! Client for the calculator demo
//!
//! Run `cargo run --example calculator_server` first.

use jrpc::client::LoggingListener;
use jrpc::JrpcClient;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tcp = JrpcClient::builder("tcp://127.0.0.1:10420").build()?;
    let http = JrpcClient::builder("http://127.0.0.1:8080/")
        .listener(LoggingListener)
        .build()?;

    let sum: i64 = tcp.invoke("add", (2, 3)).await?;
    println!("add(2, 3) = {}", sum);

    let sum3: i64 = tcp.invoke("add", (1, 2, 3)).await?;
    println!("add(1, 2, 3) = {}", sum3);

    let greeting: String = http.invoke("greet", json!({"name": "Ada"})).await?;
    println!("{}", greeting);

    let anonymous: String = http.invoke("greet", ()).await?;
    println!("{}", anonymous);

    match http.invoke::<_, f64>("divide", (1.0, 0.0)).await {
        Ok(quotient) => println!("divide(1, 0) = {}", quotient),
        Err(e) => println!("divide(1, 0) failed: {}", e),
    }

    http.notify("echo", ["fire and forget"]).await?;
    Ok(())
}
