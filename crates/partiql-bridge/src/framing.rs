//! Length-prefixed framing between the server and an engine worker.
//!
//! Request:  `u32 query_len | u32 env_len | query bytes | env bytes`
//! Response: `u32 result_len | result bytes`
//!
//! All lengths are little-endian byte counts of UTF-8 text. Declared lengths
//! are not bounded, but payload buffers grow only as bytes actually arrive.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::types::{BridgeError, BridgeResult, QueryRequest};

/// Width of every length prefix.
pub const HEADER_INT_LEN: usize = 4;

/// Write one framed request and flush.
pub async fn write_request<W>(writer: &mut W, request: &QueryRequest) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    let query = request.query().as_bytes();
    let environment = request.environment().as_bytes();

    let mut header = [0u8; HEADER_INT_LEN * 2];
    write_u32(&mut header[..HEADER_INT_LEN], encode_len("query", query)?);
    write_u32(&mut header[HEADER_INT_LEN..], encode_len("environment", environment)?);

    write_segment(writer, "request header", &header).await?;
    write_segment(writer, "query", query).await?;
    write_segment(writer, "environment", environment).await?;
    flush(writer).await
}

/// Read one framed request. Used by the worker side of the protocol.
pub async fn read_request<R>(reader: &mut R) -> BridgeResult<QueryRequest>
where
    R: AsyncRead + Unpin,
{
    let header = read_field(reader, "request header", (HEADER_INT_LEN * 2) as u32).await?;
    let query_len = read_u32(&header[..HEADER_INT_LEN]);
    let environment_len = read_u32(&header[HEADER_INT_LEN..]);

    let query = read_text(reader, "query", query_len).await?;
    let environment = read_text(reader, "environment", environment_len).await?;
    Ok(QueryRequest::new(query, environment))
}

/// Write one framed response and flush. Used by the worker side of the protocol.
pub async fn write_response<W>(writer: &mut W, result: &str) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    let payload = result.as_bytes();
    let mut header = [0u8; HEADER_INT_LEN];
    write_u32(&mut header, encode_len("result", payload)?);

    write_segment(writer, "response header", &header).await?;
    write_segment(writer, "result", payload).await?;
    flush(writer).await
}

/// Read one framed response, blocking until the declared length has arrived.
pub async fn read_response<R>(reader: &mut R) -> BridgeResult<String>
where
    R: AsyncRead + Unpin,
{
    let header = read_field(reader, "response header", HEADER_INT_LEN as u32).await?;
    let result_len = read_u32(&header);
    tracing::debug!("reading response len={result_len}");
    read_text(reader, "result", result_len).await
}

fn encode_len(field: &str, bytes: &[u8]) -> BridgeResult<u32> {
    u32::try_from(bytes.len()).map_err(|_| {
        BridgeError::Protocol(format!(
            "{field} is {} bytes, larger than a frame can declare",
            bytes.len()
        ))
    })
}

async fn write_segment<W>(writer: &mut W, field: &str, bytes: &[u8]) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(bytes)
        .await
        .map_err(|e| BridgeError::Protocol(format!("failed to write {field}: {e}")))
}

async fn flush<W>(writer: &mut W) -> BridgeResult<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .flush()
        .await
        .map_err(|e| BridgeError::Protocol(format!("failed to flush frame: {e}")))
}

/// Read exactly `len` bytes. Anything less, including end-of-stream, is a
/// short read.
async fn read_field<R>(reader: &mut R, field: &str, len: u32) -> BridgeResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    (&mut *reader)
        .take(u64::from(len))
        .read_to_end(&mut buf)
        .await
        .map_err(|e| BridgeError::Protocol(format!("failed to read {field}: {e}")))?;

    if buf.len() != len as usize {
        return Err(BridgeError::Protocol(format!(
            "short read of {field}: expected {len} bytes, got {}",
            buf.len()
        )));
    }
    Ok(buf)
}

async fn read_text<R>(reader: &mut R, field: &str, len: u32) -> BridgeResult<String>
where
    R: AsyncRead + Unpin,
{
    let bytes = read_field(reader, field, len).await?;
    String::from_utf8(bytes)
        .map_err(|e| BridgeError::Protocol(format!("{field} is not valid UTF-8: {e}")))
}

// Little-endian byte helpers
fn write_u32(buf: &mut [u8], val: u32) {
    buf[..4].copy_from_slice(&val.to_le_bytes());
}
fn read_u32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}
