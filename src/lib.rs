//! # irbridge - Infrared Remote Control over HTTP
//!
//! irbridge listens on a local port for a single kind of request,
//! `GET /sendIRcmd/<timings>`, and turns the comma-separated timings into a
//! 38 kHz infrared pulse train for an IR emitter.
//!
//! Requests are handled one at a time, so the emitter is never driven by two
//! clients at once. The emitter itself is a trait object chosen at startup.
//!
//! ## Quick Start
//!
//! ```ignore
//! use irbridge::server::{Server, ServerConfig};
//! use irbridge::transmit::LogTransmitter;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut server = Server::new(ServerConfig::default(), Arc::new(LogTransmitter));
//!     server.start().await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Routes
//!
//! - `GET /` - answers `Hello World`
//! - `GET /sendIRcmd/342,171,21,64` - transmits, answers `IR cmd sent` or
//!   `IR cmd failed` (always `200 OK`)
//! - anything else - `500 Internal Server Error`
//!
//! ## Module Overview
//!
//! - [`server`]: listening socket and the serialized accept loop
//! - [`connection`]: one request/response exchange per client
//! - [`protocol`]: request line parsing and response framing
//! - [`commands`]: route dispatch and pulse encoding
//! - [`transmit`]: the infrared emitter boundary

pub mod commands;
pub mod connection;
pub mod protocol;
pub mod server;
pub mod transmit;

// Re-export commonly used types for convenience
pub use commands::{CommandHandler, CommandOutcome, RouteOutcome};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{HttpResponse, StatusCode};
pub use server::{Server, ServerConfig, ServerError};
pub use transmit::{IrTransmitter, LogTransmitter, TransmitError};

/// The default port irbridge listens on
pub const DEFAULT_PORT: u16 = 8080;

/// The default host irbridge binds to (all interfaces)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Version of irbridge
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
