use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::http::error::{ParseError, ReadError};
use crate::http::grammar::{is_field_value, is_target, is_token};
use crate::http::request::{Method, Request, Version};

/// Default upper bound for a single request line, in bytes.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 8192;

/// Reads one request head from `reader`.
///
/// Returns `Ok(None)` when the stream ends before the first byte of a request,
/// which is how a client ends a persistent connection. A stream that ends
/// inside the header block is a `ParseError::Headers`.
pub async fn read_request<R>(reader: &mut R, max_line: usize) -> Result<Option<Request>, ReadError>
where
    R: AsyncBufRead + Unpin,
{
    let Some(start_line) = read_line(reader, max_line, ParseError::StartLine).await? else {
        return Ok(None);
    };
    let (method, target, version) = parse_start_line(&start_line)?;

    let mut request = Request::new(method, target, version);
    loop {
        let line = read_line(reader, max_line, ParseError::Headers)
            .await?
            .ok_or(ParseError::Headers)?;

        if line.is_empty() {
            break;
        }

        let (name, value) = parse_header_line(&line)?;
        request.insert_header(name, value);
    }

    Ok(Some(request))
}

/// Reads a line and trims surrounding whitespace, CRLF included.
///
/// `unit` is the error reported for an over-long or non-UTF-8 line.
async fn read_line<R>(
    reader: &mut R,
    max_line: usize,
    unit: ParseError,
) -> Result<Option<String>, ReadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    let n = (&mut *reader)
        .take(max_line as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;

    if n == 0 {
        return Ok(None);
    }
    if buf.len() > max_line {
        return Err(unit.into());
    }

    let line = std::str::from_utf8(buf.trim_ascii()).map_err(|_| unit)?;
    Ok(Some(line.to_string()))
}

/// `method SP request-target SP HTTP/DIGIT.DIGIT`
pub fn parse_start_line(line: &str) -> Result<(Method, String, Version), ParseError> {
    let mut parts = line.split(' ');

    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ParseError::StartLine);
    };

    if !is_token(method) || !is_target(target) {
        return Err(ParseError::StartLine);
    }

    let version = parse_version(version).ok_or(ParseError::StartLine)?;
    Ok((Method::from_token(method), target.to_string(), version))
}

fn parse_version(s: &str) -> Option<Version> {
    let digits = s.strip_prefix("HTTP/")?.as_bytes();
    match digits {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Some(Version::new(major - b'0', minor - b'0'))
        }
        _ => None,
    }
}

/// `field-name ":" OWS field-value OWS`
pub fn parse_header_line(line: &str) -> Result<(String, String), ParseError> {
    let (name, value) = line.split_once(':').ok_or(ParseError::Headers)?;
    let value = value.trim_matches([' ', '\t']);

    if !is_token(name) || !is_field_value(value) {
        return Err(ParseError::Headers);
    }

    Ok((name.to_string(), value.to_string()))
}
