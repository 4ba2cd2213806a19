use std::collections::HashMap;
use std::io;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::request::Version;
use crate::http::response::{Body, Response, StatusCode};

/// Size of one body chunk when streaming.
pub const CHUNK_SIZE: usize = 4096;

/// Content type of error responses.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

fn serialize_head(status: StatusCode, version: Version, headers: &HashMap<String, String>) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        version,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes the status line, the headers and the empty separator line.
pub async fn send_response_start<W>(
    out: &mut W,
    status: StatusCode,
    version: Version,
    headers: &HashMap<String, String>,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(&serialize_head(status, version, headers)).await
}

/// Writes a complete response with an in-memory body, setting
/// `Content-Type` and `Content-Length`.
pub async fn send_simple_response<W>(
    out: &mut W,
    status: StatusCode,
    body: &[u8],
    version: Version,
    content_type: &str,
) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), content_type.to_string());
    headers.insert("Content-Length".to_string(), body.len().to_string());

    send_response_start(out, status, version, &headers).await?;
    out.write_all(body).await
}

/// Copies up to `len` bytes from `reader` to `out` in chunks of at most
/// [`CHUNK_SIZE`] bytes and returns how many were written.
///
/// Stops early if the reader runs dry; the caller owns the check that the
/// count matches the `Content-Length` it announced.
pub async fn send_body_chunks<R, W>(out: &mut W, reader: &mut R, len: u64) -> io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin,
{
    let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
    let mut sent = 0u64;

    while sent < len {
        buf.clear();
        let want = (len - sent).min(CHUNK_SIZE as u64);
        let n = (&mut *reader).take(want).read_buf(&mut buf).await?;

        if n == 0 {
            break;
        }

        out.write_all(&buf[..n]).await?;
        sent += n as u64;
    }

    Ok(sent)
}

/// Writes a [`Response`] intent: head first, then the body.
pub async fn send_response<W>(out: &mut W, response: Response, version: Version) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    send_response_start(out, response.status, version, &response.headers).await?;

    match response.body {
        Body::Full(bytes) => out.write_all(&bytes).await,
        Body::Stream { mut reader, len } => {
            let sent = send_body_chunks(out, &mut reader, len).await?;
            if sent < len {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("body ended after {sent} of {len} bytes"),
                ));
            }
            Ok(())
        }
    }
}
