//! Codec for JSON-RPC documents
//!
//! This module converts between raw bytes and `serde_json::Value` trees. The
//! dispatcher works on untyped trees so that malformed requests can still be
//! answered with the right error and id.
//!
//! # Framing
//!
//! Stream transports carry one JSON document per direction. [`read_document`]
//! accumulates bytes until one complete value has arrived, leaving any
//! following bytes in the buffer for the next call, so several documents may
//! share one connection. [`read_document_limited`] also bounds the size of a
//! single document.
//!
//! # Legacy GET Form
//!
//! HTTP GET requests carry `method`, `id` and `params` as query parameters, with
//! `params` holding the JSON text URL-encoded and then base64-encoded.
//! [`decode_get_request`] rebuilds the request document from those pieces.
//!
//! # Examples
//!
//! ```rust
//! use jrpc_core::{codec, JsonRpcRequest};
//!
//! let request = JsonRpcRequest::new("ping", None, "1");
//! let bytes = codec::encode(&request).unwrap();
//!
//! let value = codec::decode(bytes.as_bytes()).unwrap();
//! assert_eq!(value["method"], "ping");
//! ```

use crate::error::{Error, Result};
use crate::types::JSONRPC_VERSION;
use base64::Engine;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

const READ_CHUNK: usize = 8 * 1024;

/// Serialize any message to JSON text
pub fn encode<T: Serialize>(msg: &T) -> Result<String> {
    serde_json::to_string(msg).map_err(|e| Error::Serialization(e.to_string()))
}

/// Parse raw bytes into a JSON tree
///
/// Malformed input yields `Error::Parse`, which the dispatcher reports as
/// a `-32700` response with a null id.
pub fn decode(data: &[u8]) -> Result<Value> {
    serde_json::from_slice(data).map_err(|e| Error::Parse(e.to_string()))
}

/// Read the next JSON document from a stream
///
/// Returns `Ok(None)` on a clean end of stream (nothing but whitespace left).
/// Bytes following the document stay in `buf`.
pub async fn read_document<R>(reader: &mut R, buf: &mut Vec<u8>) -> Result<Option<Value>>
where
    R: AsyncRead + Unpin,
{
    read_document_limited(reader, buf, usize::MAX).await
}

/// Read the next JSON document, refusing documents longer than `max_size` bytes
///
/// Every byte is scanned once to find where the document ends, and the
/// document is parsed only after that. A document that grows past `max_size`
/// fails with `Error::DocumentTooLarge` without buffering the rest of it.
pub async fn read_document_limited<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    max_size: usize,
) -> Result<Option<Value>>
where
    R: AsyncRead + Unpin,
{
    let mut boundary = Boundary::default();

    loop {
        match boundary.scan(buf) {
            Some(end) => {
                boundary.check_size(end, max_size)?;
                let value = decode(&buf[..end]);
                buf.drain(..end);
                return value.map(Some);
            }
            None => boundary.check_size(buf.len(), max_size)?,
        }

        if boundary.start.is_none() {
            // Only whitespace so far
            buf.clear();
            boundary.pos = 0;
        }

        buf.reserve(READ_CHUNK);
        let n = reader.read_buf(buf).await?;
        if n == 0 {
            return match boundary.start {
                None => Ok(None),
                Some(_) if boundary.scalar => {
                    let value = decode(&buf[..]);
                    buf.clear();
                    value.map(Some)
                }
                Some(_) => Err(Error::Parse("unexpected end of input".to_string())),
            };
        }
    }
}

/// Incremental search for the end of the first JSON value in a buffer
///
/// Tracks nesting and string state only; the value itself is validated when
/// it is parsed.
#[derive(Debug, Default)]
struct Boundary {
    /// Next byte to scan
    pos: usize,
    /// Offset of the value's first byte
    start: Option<usize>,
    depth: usize,
    in_string: bool,
    escaped: bool,
    /// The value is a bare number or literal, which only ends at a delimiter
    scalar: bool,
}

impl Boundary {
    /// Scan the unscanned part of `buf`; returns the end offset of the value
    fn scan(&mut self, buf: &[u8]) -> Option<usize> {
        while self.pos < buf.len() {
            let i = self.pos;
            let b = buf[i];
            self.pos += 1;

            if self.start.is_none() {
                if b.is_ascii_whitespace() {
                    continue;
                }
                self.start = Some(i);
                match b {
                    b'{' | b'[' => self.depth = 1,
                    b'"' => self.in_string = true,
                    b'}' | b']' => return Some(i + 1),
                    _ => self.scalar = true,
                }
                continue;
            }

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return Some(i + 1);
                    }
                }
                continue;
            }

            if self.scalar {
                if b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.') {
                    continue;
                }
                return Some(i);
            }

            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn check_size(&self, end: usize, max_size: usize) -> Result<()> {
        match self.start {
            Some(start) if end - start > max_size => {
                Err(Error::DocumentTooLarge { limit: max_size })
            }
            _ => Ok(()),
        }
    }
}

/// Write one JSON document to a stream and flush it
pub async fn write_document<W>(writer: &mut W, value: &Value) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let bytes = serde_json::to_vec(value)?;
    writer.write_all(&bytes).await?;
    writer.flush().await?;
    Ok(())
}

/// Rebuild a request document from the legacy HTTP GET query parameters
///
/// `params` is base64 of the URL-encoded JSON text. The id is carried as a
/// string; without one the request is a notification. A missing method is
/// left out so the dispatcher rejects the request as invalid.
pub fn decode_get_request(
    method: Option<&str>,
    id: Option<&str>,
    params: Option<&str>,
) -> Result<Value> {
    let mut request = Map::new();
    request.insert("jsonrpc".to_string(), Value::String(JSONRPC_VERSION.to_string()));
    if let Some(method) = method {
        request.insert("method".to_string(), Value::String(method.to_string()));
    }

    if let Some(encoded) = params {
        let raw = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::Parse(format!("params are not valid base64: {}", e)))?;
        let text = String::from_utf8(raw)
            .map_err(|e| Error::Parse(format!("params are not valid UTF-8: {}", e)))?;
        let json = urlencoding::decode(&text)
            .map_err(|e| Error::Parse(format!("params are not valid URL encoding: {}", e)))?;
        request.insert("params".to_string(), decode(json.as_bytes())?);
    }

    if let Some(id) = id {
        request.insert("id".to_string(), Value::String(id.to_string()));
    }

    Ok(Value::Object(request))
}

/// Encode params for the legacy HTTP GET form
pub fn encode_get_params(params: &Value) -> Result<String> {
    let json = encode(params)?;
    let escaped = urlencoding::encode(&json);
    Ok(base64::engine::general_purpose::STANDARD.encode(escaped.as_bytes()))
}
