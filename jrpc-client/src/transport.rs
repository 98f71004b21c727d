//! Client transports
//!
//! A [`Transport`] moves one request document to the server and, for calls,
//! one response document back. The client owns all protocol logic; transports
//! only frame and carry JSON.
//!
//! - [`HttpTransport`]: HTTP POST with reqwest
//! - [`StreamTransport`]: raw TCP, one connection per round trip
//!
//! # Timeouts
//!
//! Both transports apply a connect timeout and a read timeout. An elapsed
//! timeout surfaces as `Error::Timeout`.

use async_trait::async_trait;
use jrpc_core::{codec, Error, Result, JSONRPC_CONTENT_TYPE};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Connect timeout used when none is configured
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Read timeout used when none is configured
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(120);

/// Carries JSON-RPC documents to a server
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the response document
    async fn call(&self, request: &Value) -> Result<Value>;

    /// Send a notification; nothing is read back
    async fn send(&self, notification: &Value) -> Result<()>;
}

/// JSON-RPC over HTTP POST
///
/// # Examples
///
/// ```rust,no_run
/// use jrpc_client::HttpTransport;
/// use std::time::Duration;
///
/// # fn example() -> jrpc_core::Result<()> {
/// let transport = HttpTransport::new(
///     "http://localhost:8080/",
///     Duration::from_secs(5),
///     Duration::from_secs(30),
///     &[("Authorization".to_string(), "Bearer token".to_string())],
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport posting to `url`
    ///
    /// `headers` are added to every request. The content type is always
    /// `application/json-rpc`.
    pub fn new(
        url: impl Into<String>,
        connect_timeout: Duration,
        read_timeout: Duration,
        headers: &[(String, String)],
    ) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Http(format!("Invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Http(format!("Invalid header value: {}", e)))?;
            default_headers.insert(name, value);
        }
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSONRPC_CONTENT_TYPE));

        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .default_headers(default_headers)
            .build()
            .map_err(http_error)?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, document: &Value) -> Result<reqwest::Response> {
        self.client
            .post(&self.url)
            .body(codec::encode(document)?)
            .send()
            .await
            .map_err(http_error)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[tracing::instrument(skip(self, request), fields(url = %self.url))]
    async fn call(&self, request: &Value) -> Result<Value> {
        let response = self.post(request).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(http_error)?;

        // Error statuses may still carry a JSON-RPC error document
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Protocol(format!(
                "Empty response body (HTTP {})",
                status
            )));
        }

        codec::decode(&body).map_err(|e| Error::Protocol(e.to_string()))
    }

    async fn send(&self, notification: &Value) -> Result<()> {
        let response = self.post(notification).await?;
        tracing::debug!(status = %response.status(), "Notification delivered");
        Ok(())
    }
}

fn http_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout
    } else {
        Error::Http(e.to_string())
    }
}

/// JSON-RPC over a raw TCP socket
///
/// Every round trip opens a fresh connection, writes one document and reads
/// one document back.
#[derive(Debug, Clone)]
pub struct StreamTransport {
    addr: String,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl StreamTransport {
    /// Create a transport connecting to `addr` (e.g., "127.0.0.1:10420")
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    async fn connect(&self) -> Result<TcpStream> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| Error::Timeout)??;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}

#[async_trait]
impl Transport for StreamTransport {
    #[tracing::instrument(skip(self, request), fields(addr = %self.addr))]
    async fn call(&self, request: &Value) -> Result<Value> {
        let mut stream = self.connect().await?;
        codec::write_document(&mut stream, request).await?;

        let mut buf = Vec::new();
        let response = tokio::time::timeout(
            self.read_timeout,
            codec::read_document(&mut stream, &mut buf),
        )
        .await
        .map_err(|_| Error::Timeout)?
        .map_err(|e| match e {
            Error::Parse(msg) => Error::Protocol(msg),
            other => other,
        })?;

        response.ok_or(Error::ConnectionClosed)
    }

    async fn send(&self, notification: &Value) -> Result<()> {
        let mut stream = self.connect().await?;
        codec::write_document(&mut stream, notification).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::net::TcpListener;

    #[test]
    fn test_http_transport_rejects_bad_header() {
        let result = HttpTransport::new(
            "http://localhost:1/",
            DEFAULT_CONNECT_TIMEOUT,
            DEFAULT_READ_TIMEOUT,
            &[("bad header".to_string(), "x".to_string())],
        );
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[test]
    fn test_stream_transport_defaults() {
        let transport = StreamTransport::new("127.0.0.1:10420");
        assert_eq!(transport.addr(), "127.0.0.1:10420");
        assert_eq!(transport.connect_timeout, Duration::from_secs(60));
        assert_eq!(transport.read_timeout, Duration::from_secs(120));
    }

    #[tokio::test]
    async fn test_stream_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let request = codec::read_document(&mut socket, &mut buf)
                .await
                .unwrap()
                .unwrap();
            let response = json!({"jsonrpc": "2.0", "result": request["method"], "id": request["id"]});
            codec::write_document(&mut socket, &response).await.unwrap();
        });

        let transport = StreamTransport::new(addr.to_string());
        let response = transport
            .call(&json!({"jsonrpc": "2.0", "method": "echo", "id": "7"}))
            .await
            .unwrap();
        assert_eq!(response["result"], "echo");
        assert_eq!(response["id"], "7");
    }

    #[tokio::test]
    async fn test_stream_closed_without_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            drop(socket);
        });

        let transport = StreamTransport::new(addr.to_string());
        let result = transport.call(&json!({"jsonrpc": "2.0", "method": "m", "id": "1"})).await;
        assert!(matches!(result, Err(Error::ConnectionClosed) | Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_stream_read_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
            drop(socket);
        });

        let transport =
            StreamTransport::new(addr.to_string()).with_read_timeout(Duration::from_millis(50));
        let result = transport.call(&json!({"jsonrpc": "2.0", "method": "m", "id": "1"})).await;
        assert!(matches!(result, Err(Error::Timeout)));
        server.abort();
    }
}
