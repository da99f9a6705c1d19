//! Minimal HTTP/1.0 Protocol
//!
//! irbridge answers exactly one request per connection, so the protocol layer
//! is small:
//!
//! - `request`: finds the `GET /<route>` line in the incoming header block
//! - `response`: frames a status line, headers and body for the reply
//!
//! ## Example
//!
//! ```
//! use irbridge::protocol::{parse_request_line, HttpResponse};
//!
//! let route = parse_request_line("GET / HTTP/1.0");
//! assert_eq!(route, Some(""));
//!
//! let bytes = HttpResponse::ok("Hello World").serialize();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! ```

pub mod request;
pub mod response;

// Re-export commonly used types for convenience
pub use request::{parse_request_line, read_route, RequestError, MAX_REQUEST_HEAD};
pub use response::{HttpResponse, StatusCode};
