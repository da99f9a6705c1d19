//! Connection Handler Module
//!
//! This module handles one client connection from start to finish. Unlike a
//! keep-alive server there is no loop here: a connection carries exactly one
//! request and is closed once the response is out.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Accept loop hands over the TcpStream
//!        │
//!        ▼
//! 2. Read header lines until `GET /<route>` or a blank line
//!        │
//!        ▼
//! 3. CommandHandler turns the route into a response
//!        │
//!        ▼
//! 4. Write status line, headers, body; flush
//!        │
//!        ▼
//! 5. Shut down the write side, drop the stream
//! ```
//!
//! Errors never leave this module: [`handle_connection`] logs them and
//! returns, so the accept loop carries on with the next client.

use crate::commands::{CommandHandler, RouteOutcome};
use crate::protocol::{read_route, HttpResponse, RequestError};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, trace, warn};

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections handled
    pub connections_handled: AtomicU64,
    /// IR commands that reached the transmitter successfully
    pub commands_sent: AtomicU64,
    /// IR commands rejected or failed at the transmitter
    pub commands_failed: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_handled(&self) {
        self.connections_handled.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_sent(&self) {
        self.commands_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_failed(&self) {
        self.commands_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so the same code serves a `TcpStream` and the
/// scripted streams used in tests.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: S,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Route dispatcher
    command_handler: CommandHandler,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream
    /// * `addr` - The client's socket address
    /// * `command_handler` - Dispatcher for the request route
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        Self {
            stream,
            addr,
            command_handler,
            stats,
        }
    }

    /// Reads the request, writes the response and closes the stream.
    ///
    /// The write side is shut down on every path that reaches the writing
    /// stage, whether or not the write succeeded.
    pub async fn run(mut self) -> Result<HttpResponse, ConnectionError> {
        debug!(client = %self.addr, "Client connected");
        self.stats.connection_handled();

        let route = self.read_request().await?;
        trace!(client = %self.addr, route = ?route, "Read request");

        let response = match route.as_deref() {
            Some(route) => {
                let outcome = self.command_handler.dispatch(route);
                self.record(&outcome);
                outcome.into_response()
            }
            None => {
                debug!(client = %self.addr, "No request line found");
                HttpResponse::server_error()
            }
        };

        let written = self.send_response(&response).await;
        let closed = self.stream.shutdown().await;
        written?;
        closed?;

        debug!(
            client = %self.addr,
            status = %response.status(),
            "Response sent"
        );
        Ok(response)
    }

    /// Reads header lines until the route is known.
    async fn read_request(&mut self) -> Result<Option<String>, ConnectionError> {
        let mut reader = BufReader::new(&mut self.stream);
        let route = read_route(&mut reader).await?;

        // Whatever sits in the buffer past the request line is discarded
        // along with the reader.
        let buffered = reader.buffer().len();
        if buffered > 0 {
            trace!(client = %self.addr, bytes = buffered, "Discarding unread request bytes");
        }
        Ok(route)
    }

    fn record(&self, outcome: &RouteOutcome) {
        if let RouteOutcome::Command(command) = outcome {
            if command.is_sent() {
                self.stats.command_sent();
            } else {
                self.stats.command_failed();
            }
        }
    }

    /// Sends the framed response and flushes it.
    async fn send_response(&mut self, response: &HttpResponse) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            bytes = bytes.len(),
            "Sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The request head could not be read
    #[error("Request error: {0}")]
    Request(#[from] RequestError),
}

impl ConnectionError {
    /// True when the client reset the connection, whether that surfaced
    /// while reading the request or while writing the response.
    pub fn is_reset(&self) -> bool {
        let io_err = match self {
            ConnectionError::IoError(e) | ConnectionError::Request(RequestError::Io(e)) => e,
            ConnectionError::Request(RequestError::HeadTooLarge { .. }) => return false,
        };
        io_err.kind() == std::io::ErrorKind::ConnectionReset
    }
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler and runs
/// it to completion. Any error is logged and dropped here.
///
/// # Arguments
///
/// * `stream` - The client stream
/// * `addr` - The client's socket address
/// * `command_handler` - Dispatcher for the request route
/// * `stats` - Shared connection statistics
pub async fn handle_connection<S>(
    stream: S,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    match handler.run().await {
        Ok(_) => {}
        Err(e) if e.is_reset() => debug!(client = %addr, "Connection reset by client"),
        Err(e) => warn!(client = %addr, error = %e, "Connection ended with error"),
    }
}
