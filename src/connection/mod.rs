//! Connection Handling
//!
//! This module handles the single request carried by each client connection.
//! Connections are handled one after another by the accept loop in
//! [`crate::server`]; nothing here spawns tasks.
//!
//! ## Example
//!
//! ```ignore
//! use irbridge::connection::{handle_connection, ConnectionStats};
//! use irbridge::commands::CommandHandler;
//! use irbridge::transmit::LogTransmitter;
//! use std::sync::Arc;
//!
//! let stats = Arc::new(ConnectionStats::new());
//! let handler = CommandHandler::new(Arc::new(LogTransmitter));
//!
//! let (stream, addr) = listener.accept().await?;
//! handle_connection(stream, addr, handler, stats).await;
//! ```

pub mod handler;

// Re-export commonly used types
pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
