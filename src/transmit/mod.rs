//! Infrared Transmit Boundary
//!
//! The transmitter is the only piece of hardware irbridge talks to. It is
//! modelled as a single-operation trait so the command pipeline never reaches
//! for a global handle: whoever builds the [`CommandHandler`] decides which
//! transmitter it drives.
//!
//! [`LogTransmitter`] emits the pulse train through `tracing` instead of a
//! driver. The binary uses it when no hardware backend is wired in.
//!
//! ## Serialization
//!
//! Transmitters are `Send + Sync` because they are shared behind an `Arc`,
//! but the accept loop never calls `transmit` from two requests at once.
//! Implementations don't need their own mutual exclusion around the hardware.
//!
//! [`CommandHandler`]: crate::commands::CommandHandler

use thiserror::Error;
use tracing::{debug, info};

/// Errors reported by a transmitter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransmitError {
    /// No emitter is present or it could not be opened
    #[error("IR emitter unavailable: {0}")]
    Unavailable(String),

    /// The driver failed while sending
    #[error("hardware failure: {0}")]
    Hardware(String),
}

/// A device capable of emitting a modulated infrared pulse train.
pub trait IrTransmitter: Send + Sync {
    /// Emits `pattern` on a carrier of `carrier_frequency_hz`.
    ///
    /// `pattern` alternates on/off durations starting with "on", in
    /// microseconds.
    fn transmit(&self, carrier_frequency_hz: u32, pattern: &[i32]) -> Result<(), TransmitError>;
}

/// Transmitter that only logs what it would have sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTransmitter;

impl LogTransmitter {
    pub fn new() -> Self {
        Self
    }
}

impl IrTransmitter for LogTransmitter {
    fn transmit(&self, carrier_frequency_hz: u32, pattern: &[i32]) -> Result<(), TransmitError> {
        info!(
            frequency = carrier_frequency_hz,
            pulses = pattern.len(),
            "Transmitting IR pattern"
        );
        debug!(?pattern, "IR pattern");
        Ok(())
    }
}
