//! Command Pipeline
//!
//! Everything between "a route was read" and "a response is ready", with no
//! socket I/O involved.
//!
//! ## Architecture
//!
//! ```text
//!   route string
//!        │
//!        ▼
//! ┌─────────────────┐
//! │ CommandHandler  │  (handler)
//! │  - greeting     │
//! │  - IR command ──┼──> encoding: "10,20" -> [263, 526]
//! │  - not found    │          │
//! └────────┬────────┘          ▼
//!          │            IrTransmitter::transmit(38000, pattern)
//!          ▼
//!    HttpResponse
//! ```

pub mod encoding;
pub mod handler;

// Re-export the main command handler
pub use encoding::{encode_payload, CommandParseError, PulsePattern};
pub use handler::{CommandHandler, CommandOutcome, RouteOutcome};
