//! Request Line Parsing
//!
//! Only one thing is taken from a request: the route. The reader walks the
//! header block line by line until it meets a line starting with `GET /`,
//! a blank line, or the end of the stream.
//!
//! ```text
//! GET /sendIRcmd/10,20,30 HTTP/1.0\r\n     -> route = "sendIRcmd/10,20,30"
//! GET / HTTP/1.0\r\n                       -> route = ""
//! POST /x HTTP/1.0\r\n\r\n                 -> no route
//! ```
//!
//! Nothing else is validated: not the version, not the headers, not the
//! method beyond the literal prefix.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Prefix a line must start with to count as the request line
pub const REQUEST_PREFIX: &str = "GET /";

/// Upper bound on the bytes read while looking for the request line (8 KB)
pub const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Errors that can occur while reading a request head.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// I/O error while reading from the client
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The header block grew past [`MAX_REQUEST_HEAD`]
    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },
}

/// Extracts the route from a single request line.
///
/// Returns `None` if the line doesn't start with [`REQUEST_PREFIX`]. The
/// route runs from just after the first `/` up to the next whitespace, or to
/// the end of the line if there is none.
///
/// # Example
///
/// ```
/// use irbridge::protocol::request::parse_request_line;
///
/// assert_eq!(parse_request_line("GET /sendIRcmd/1,2 HTTP/1.0"), Some("sendIRcmd/1,2"));
/// assert_eq!(parse_request_line("GET / HTTP/1.0"), Some(""));
/// assert_eq!(parse_request_line("HEAD / HTTP/1.0"), None);
/// ```
pub fn parse_request_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(REQUEST_PREFIX)?;
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Reads header lines from `reader` until the route is found.
///
/// Returns `Ok(None)` if a blank line or end of stream comes first. Reading
/// stops as soon as the request line is seen; the rest of the headers are
/// left unread. Running into [`MAX_REQUEST_HEAD`] before either is an error,
/// even when the limit falls exactly on a line boundary.
pub async fn read_route<R>(reader: &mut R) -> Result<Option<String>, RequestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut limited = reader.take(MAX_REQUEST_HEAD as u64);
    let mut line = Vec::with_capacity(256);

    loop {
        line.clear();
        let n = limited.read_until(b'\n', &mut line).await?;
        let exhausted = limited.limit() == 0;
        if (n == 0 || line.last() != Some(&b'\n')) && exhausted {
            return Err(RequestError::HeadTooLarge {
                limit: MAX_REQUEST_HEAD,
            });
        }
        if n == 0 {
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\r', '\n']);
        if text.is_empty() {
            return Ok(None);
        }

        if let Some(route) = parse_request_line(text) {
            return Ok(Some(route.to_string()));
        }
    }
}
