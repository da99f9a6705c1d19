//! Response Framing
//!
//! irbridge speaks just enough HTTP/1.0 for a browser or `curl` to read the
//! answer. Every response is one of two shapes:
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: text/plain; charset=utf-8\r\n
//! Content-Length: 11\r\n
//! \r\n
//! Hello World
//! ```
//!
//! ```text
//! HTTP/1.0 500 Internal Server Error\r\n
//! \r\n
//! ```
//!
//! `Content-Length` is always computed from the body being written, never
//! supplied by the caller.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;

/// Line terminator for the status line and headers
pub const CRLF: &[u8] = b"\r\n";

/// Protocol version written on every status line
pub const HTTP_VERSION: &str = "HTTP/1.0";

/// Content type sent with every successful response
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Status codes irbridge can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    InternalServerError,
}

impl StatusCode {
    pub fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::InternalServerError => 500,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// A response ready to be framed and written to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status: StatusCode,
    body: Option<Bytes>,
}

impl HttpResponse {
    /// Creates a `200 OK` response carrying `body`.
    ///
    /// # Example
    /// ```
    /// use irbridge::protocol::HttpResponse;
    /// let response = HttpResponse::ok("Hello World");
    /// assert_eq!(response.body(), b"Hello World");
    /// ```
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::Ok,
            body: Some(body.into()),
        }
    }

    /// Creates a bodiless `500 Internal Server Error` response.
    pub fn server_error() -> Self {
        Self {
            status: StatusCode::InternalServerError,
            body: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The body bytes; empty for error responses.
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Serializes the full response (status line, headers, body).
    pub fn serialize(&self) -> Bytes {
        let body = self.body();
        let mut buf = BytesMut::with_capacity(128 + body.len());

        buf.put_slice(format!("{} {}", HTTP_VERSION, self.status).as_bytes());
        buf.put_slice(CRLF);

        if self.body.is_some() {
            buf.put_slice(b"Content-Type: ");
            buf.put_slice(CONTENT_TYPE.as_bytes());
            buf.put_slice(CRLF);
            buf.put_slice(b"Content-Length: ");
            buf.put_slice(body.len().to_string().as_bytes());
            buf.put_slice(CRLF);
        }

        buf.put_slice(CRLF);
        buf.put_slice(body);
        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Pulls the Content-Length header out of a serialized response and
    /// returns it alongside the bytes that follow the header block.
    fn split_response(raw: &[u8]) -> (Option<usize>, Vec<u8>) {
        let text = std::str::from_utf8(raw).unwrap();
        let (head, body) = text.split_once("\r\n\r\n").unwrap();
        let length = head
            .lines()
            .find_map(|line| line.strip_prefix("Content-Length: "))
            .map(|v| v.parse().unwrap());
        (length, body.as_bytes().to_vec())
    }

    #[test]
    fn test_ok_serialize() {
        let response = HttpResponse::ok("Hello World");
        assert_eq!(
            &response.serialize()[..],
            b"HTTP/1.0 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: 11\r\n\r\nHello World"
        );
    }

    #[test]
    fn test_server_error_serialize() {
        let response = HttpResponse::server_error();
        assert_eq!(
            &response.serialize()[..],
            b"HTTP/1.0 500 Internal Server Error\r\n\r\n"
        );
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_content_length_matches_body() {
        for body in ["Hello World", "IR cmd sent", "IR cmd failed", "", "héllo"] {
            let raw = HttpResponse::ok(body).serialize();
            let (length, rest) = split_response(&raw);
            assert_eq!(length, Some(body.len()));
            assert_eq!(rest, body.as_bytes());
        }
    }

    #[test]
    fn test_binary_body() {
        let body = Bytes::from_static(&[0, 159, 146, 150]);
        let raw = HttpResponse::ok(body.clone()).serialize();
        assert!(raw.ends_with(&body));
        assert!(raw.starts_with(b"HTTP/1.0 200 OK\r\n"));
        let needle = b"Content-Length: 4\r\n";
        assert!(raw.windows(needle.len()).any(|w| w == needle));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(StatusCode::Ok.to_string(), "200 OK");
        assert_eq!(
            StatusCode::InternalServerError.to_string(),
            "500 Internal Server Error"
        );
    }
}
