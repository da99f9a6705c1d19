//! Connection Acceptor
//!
//! [`Server`] owns the listening socket and the single background task that
//! accepts clients. Each accepted connection is handled to completion inside
//! that task before the next `accept()`, so at most one request (and one IR
//! transmission) is in flight at any time.
//!
//! ## Lifecycle
//!
//! ```text
//!  Server::new ──> start() ──────────────> stop()
//!                    │ bind                  │ shutdown_tx.send(true)
//!                    │ spawn accept loop     │ await the task
//!                    ▼                       ▼
//!             ┌──────────────┐       select! sees the signal,
//!             │ accept loop  │       loop returns, listener
//!             │  accept()    │       dropped: port released
//!             │  handle()    │
//!             └──────────────┘
//! ```
//!
//! ## Shutdown Signal
//!
//! The watch channel is the server's only piece of cross-task state. `stop()`
//! is its only writer and the accept loop its only reader. A `stop()` that
//! lands while `accept()` is pending just ends the loop; it is logged at
//! debug level, never as an error. A request that is already being handled
//! runs to completion first.

use crate::commands::CommandHandler;
use crate::connection::{handle_connection, ConnectionStats};
use crate::transmit::IrTransmitter;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (0 picks an ephemeral port)
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: crate::DEFAULT_HOST.to_string(),
            port: crate::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address as a string
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Errors returned by [`Server::start`].
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start()` was called while the accept loop is still running
    #[error("server is already running")]
    AlreadyRunning,

    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Other socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// State kept while the accept loop is alive.
#[derive(Debug)]
struct Running {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
}

/// The IR command server.
///
/// # Example
///
/// ```ignore
/// use irbridge::server::{Server, ServerConfig};
/// use irbridge::transmit::LogTransmitter;
/// use std::sync::Arc;
///
/// let mut server = Server::new(ServerConfig::default(), Arc::new(LogTransmitter));
/// let addr = server.start().await?;
/// // ... serve until told otherwise ...
/// server.stop().await;
/// ```
pub struct Server {
    config: ServerConfig,
    handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    running: Option<Running>,
}

impl Server {
    /// Creates a stopped server that will drive `transmitter`.
    pub fn new(config: ServerConfig, transmitter: Arc<dyn IrTransmitter>) -> Self {
        Self {
            config,
            handler: CommandHandler::new(transmitter),
            stats: Arc::new(ConnectionStats::new()),
            running: None,
        }
    }

    /// Shared statistics across every connection this server handled.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// True while the accept loop is alive.
    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    /// Binds the listener and spawns the accept loop.
    ///
    /// Returns the bound address, which differs from the configured one when
    /// port 0 was requested.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyRunning`] if the accept loop is still alive
    /// - [`ServerError::Bind`] if the address can't be bound
    pub async fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.is_running() {
            return Err(ServerError::AlreadyRunning);
        }
        // A loop that died on an accept error leaves its state behind
        self.running = None;

        let addr = self.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(
            listener,
            self.handler.clone(),
            Arc::clone(&self.stats),
            shutdown_rx,
        ));

        info!(addr = %local_addr, "Listening for IR commands");

        self.running = Some(Running {
            shutdown_tx,
            task,
            local_addr,
        });
        Ok(local_addr)
    }

    /// Stops the accept loop and waits for it to release the socket.
    ///
    /// A request already being handled is finished first. Calling this on a
    /// stopped server does nothing.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        let _ = running.shutdown_tx.send(true);
        if let Err(e) = running.task.await {
            warn!(error = %e, "Accept loop task ended abnormally");
        }
        info!(addr = %running.local_addr, "Server stopped");
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if let Some(running) = &self.running {
            let _ = running.shutdown_tx.send(true);
        }
    }
}

/// Accepts clients one at a time until shutdown or a fatal accept error.
async fn accept_loop(
    listener: TcpListener,
    handler: CommandHandler,
    stats: Arc<ConnectionStats>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let accepted = tokio::select! {
            biased;
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Accept loop received shutdown signal");
                    break;
                }
                continue;
            }
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                // Inline, not spawned: requests are serialized
                handle_connection(stream, addr, handler.clone(), Arc::clone(&stats)).await;
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection, stopping server");
                break;
            }
        }
    }

    debug!("Accept loop exited, closing listener");
}
