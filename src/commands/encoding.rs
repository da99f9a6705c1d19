//! Pulse Encoding
//!
//! Converts the comma-separated payload of an IR command into the integer
//! pulse train handed to the transmitter.
//!
//! ## Format
//!
//! ```text
//! payload  = token *( "," token )
//! token    = decimal number (Rust `f64` syntax, finite)
//! pulse[i] = round_half_even(token[i] * 26.3)
//! ```
//!
//! The 26.3 factor converts protocol units into microseconds for the
//! 38 kHz remote-control family irbridge targets. It must not be adjusted:
//! receivers decode against the exact timings it produces.
//!
//! Parsing is all-or-nothing. One bad token rejects the whole command and
//! nothing is transmitted.

use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// Carrier frequency for every transmission, in hertz.
pub const CARRIER_FREQUENCY_HZ: u32 = 38_000;

/// Multiplier from payload units to pulse microseconds.
pub const PULSE_SCALE: f64 = 26.3;

/// Separator between payload tokens.
pub const TOKEN_SEPARATOR: char = ',';

/// Reasons a command payload can be rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CommandParseError {
    /// Nothing after the last path separator
    #[error("empty payload")]
    EmptyPayload,

    /// Two separators in a row, or a leading/trailing separator
    #[error("empty token at position {0}")]
    EmptyToken(usize),

    /// Token is not a decimal number
    #[error("invalid number {token:?} at position {index}")]
    InvalidNumber { index: usize, token: String },

    /// Token is not finite, or its pulse doesn't fit a 32-bit duration
    #[error("value {token:?} at position {index} is out of range")]
    OutOfRange { index: usize, token: String },
}

/// Ordered pulse durations in microseconds.
///
/// Built once by [`encode_pulses`] and never modified afterwards; it only
/// hands out shared views of its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PulsePattern(Vec<i32>);

impl Deref for PulsePattern {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        &self.0
    }
}

impl fmt::Display for PulsePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pulse) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", pulse)?;
        }
        Ok(())
    }
}

/// Splits a payload on `,` and parses every token as a decimal number.
///
/// # Example
///
/// ```
/// use irbridge::commands::encoding::parse_payload;
///
/// assert_eq!(parse_payload("10,20.5").unwrap(), vec![10.0, 20.5]);
/// assert!(parse_payload("10,abc").is_err());
/// ```
pub fn parse_payload(payload: &str) -> Result<Vec<f64>, CommandParseError> {
    if payload.is_empty() {
        return Err(CommandParseError::EmptyPayload);
    }

    payload
        .split(TOKEN_SEPARATOR)
        .enumerate()
        .map(|(index, token)| {
            if token.is_empty() {
                return Err(CommandParseError::EmptyToken(index));
            }
            token
                .parse::<f64>()
                .map_err(|_| CommandParseError::InvalidNumber {
                    index,
                    token: token.to_string(),
                })
        })
        .collect()
}

/// Scales each value by [`PULSE_SCALE`] and rounds it to whole microseconds.
///
/// Ties round to even, so `x.5` goes to the nearest even integer.
pub fn encode_pulses(values: &[f64]) -> Result<PulsePattern, CommandParseError> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| {
            to_pulse(value * PULSE_SCALE).ok_or_else(|| CommandParseError::OutOfRange {
                index,
                token: value.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(PulsePattern)
}

/// Parses and encodes a payload in one step.
pub fn encode_payload(payload: &str) -> Result<PulsePattern, CommandParseError> {
    let values = parse_payload(payload)?;
    encode_pulses(&values)
}

fn to_pulse(scaled: f64) -> Option<i32> {
    if !scaled.is_finite() {
        return None;
    }
    let rounded = scaled.round_ties_even();
    if rounded < i32::MIN as f64 || rounded > i32::MAX as f64 {
        return None;
    }
    Some(rounded as i32)
}
