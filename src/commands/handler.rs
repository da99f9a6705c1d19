//! Route Dispatch
//!
//! The [`CommandHandler`] decides what a route means and produces the
//! response body. It performs no socket I/O; the connection layer feeds it a
//! route and writes back whatever [`HttpResponse`] it returns.
//!
//! ## Routes
//!
//! Matched in order:
//!
//! | Route                          | Outcome                              |
//! |--------------------------------|--------------------------------------|
//! | `""` or `"/"`                  | `200 OK`, body `Hello World`         |
//! | contains `sendircmd` (any case)| IR command, body `IR cmd sent`/`failed` |
//! | anything else                  | `500 Internal Server Error`          |
//!
//! An IR command always answers `200 OK`. Whether the signal went out is
//! reported in the body only; the two failure causes (bad payload, transmitter
//! error) share the `IR cmd failed` body but stay distinct in
//! [`CommandOutcome`] for logging.

use crate::commands::encoding::{encode_payload, CommandParseError, CARRIER_FREQUENCY_HZ};
use crate::protocol::HttpResponse;
use crate::transmit::{IrTransmitter, TransmitError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Body for the root route
pub const GREETING: &str = "Hello World";

/// Body when the pulse train was transmitted
pub const SENT_BODY: &str = "IR cmd sent";

/// Body when the payload was rejected or the transmitter failed
pub const FAILED_BODY: &str = "IR cmd failed";

/// Keyword that marks a route as an IR command (compared case-insensitively)
pub const COMMAND_KEYWORD: &str = "sendircmd";

/// Result of running one IR command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The pulse train went out; carries the number of pulses sent
    Sent { pulses: usize },
    /// The payload could not be turned into a pulse train
    ParseFailed(CommandParseError),
    /// The transmitter reported an error
    TransmitFailed(TransmitError),
}

impl CommandOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, CommandOutcome::Sent { .. })
    }

    /// The text sent back to the client.
    pub fn body(&self) -> &'static str {
        match self {
            CommandOutcome::Sent { .. } => SENT_BODY,
            CommandOutcome::ParseFailed(_) | CommandOutcome::TransmitFailed(_) => FAILED_BODY,
        }
    }
}

/// What a route resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Root route
    Greeting,
    /// IR command route
    Command(CommandOutcome),
    /// No handler for the route
    NotFound,
}

impl RouteOutcome {
    /// Frames the outcome as a response.
    pub fn into_response(self) -> HttpResponse {
        match self {
            RouteOutcome::Greeting => HttpResponse::ok(GREETING),
            RouteOutcome::Command(outcome) => HttpResponse::ok(outcome.body()),
            RouteOutcome::NotFound => HttpResponse::server_error(),
        }
    }
}

/// Turns routes into responses, driving the IR transmitter for commands.
#[derive(Clone)]
pub struct CommandHandler {
    transmitter: Arc<dyn IrTransmitter>,
}

impl CommandHandler {
    /// Creates a handler that sends IR commands through `transmitter`.
    pub fn new(transmitter: Arc<dyn IrTransmitter>) -> Self {
        Self { transmitter }
    }

    /// Resolves a route to its outcome.
    pub fn dispatch(&self, route: &str) -> RouteOutcome {
        if route.is_empty() || route == "/" {
            return RouteOutcome::Greeting;
        }

        if is_command_route(route) {
            return RouteOutcome::Command(self.send_command(route));
        }

        debug!(route = %route, "No handler for route");
        RouteOutcome::NotFound
    }

    /// Parses the payload of a command route and transmits it.
    ///
    /// The payload is everything after the last `/` in the route.
    pub fn send_command(&self, route: &str) -> CommandOutcome {
        let payload = command_payload(route);

        let pattern = match encode_payload(payload) {
            Ok(pattern) => pattern,
            Err(e) => {
                warn!(payload = %payload, error = %e, "Rejected IR command");
                return CommandOutcome::ParseFailed(e);
            }
        };

        match self.transmitter.transmit(CARRIER_FREQUENCY_HZ, &pattern) {
            Ok(()) => {
                debug!(pulses = pattern.len(), pattern = %pattern, "IR command sent");
                CommandOutcome::Sent {
                    pulses: pattern.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "IR transmitter failed");
                CommandOutcome::TransmitFailed(e)
            }
        }
    }
}

/// Returns true if the route carries the command keyword anywhere.
pub fn is_command_route(route: &str) -> bool {
    route.to_ascii_lowercase().contains(COMMAND_KEYWORD)
}

/// Returns the part of the route after its last `/`, or the whole route if
/// it has none.
pub fn command_payload(route: &str) -> &str {
    match route.rfind('/') {
        Some(pos) => &route[pos + 1..],
        None => route,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StatusCode;
    use crate::transmit::recording::RecordingTransmitter;

    fn setup() -> (CommandHandler, Arc<RecordingTransmitter>) {
        let tx = Arc::new(RecordingTransmitter::new());
        let handler = CommandHandler::new(tx.clone());
        (handler, tx)
    }

    #[test]
    fn test_root_routes_greet() {
        let (handler, tx) = setup();
        for route in ["", "/"] {
            let response = handler.dispatch(route).into_response();
            assert_eq!(response.status(), StatusCode::Ok);
            assert_eq!(response.body(), b"Hello World");
        }
        assert_eq!(tx.count(), 0);
    }

    #[test]
    fn test_command_sent() {
        let (handler, tx) = setup();
        let response = handler.dispatch("sendIRcmd/10,20,30").into_response();

        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"IR cmd sent");

        let sent = tx.transmissions();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].carrier_frequency_hz, 38_000);
        assert_eq!(sent[0].pattern, vec![263, 526, 789]);
    }

    #[test]
    fn test_command_keyword_is_case_insensitive_substring() {
        let (handler, tx) = setup();
        for route in [
            "SENDIRCMD/1",
            "sendircmd/1",
            "remote?sendIRcmd/1",
            "api/v1/sendIrCmd/1",
        ] {
            let outcome = handler.dispatch(route);
            assert_eq!(outcome, RouteOutcome::Command(CommandOutcome::Sent { pulses: 1 }));
        }
        assert_eq!(tx.count(), 4);
    }

    #[test]
    fn test_command_without_trailing_separator() {
        let (handler, tx) = setup();
        // No slash after the keyword: the payload is the whole route
        let outcome = handler.dispatch("sendIRcmd10,20");
        assert!(matches!(
            outcome,
            RouteOutcome::Command(CommandOutcome::ParseFailed(_))
        ));
        assert_eq!(tx.count(), 0);
    }

    #[test]
    fn test_empty_payload_fails_without_transmitting() {
        let (handler, tx) = setup();
        let response = handler.dispatch("sendIRcmd/").into_response();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"IR cmd failed");
        assert_eq!(tx.count(), 0);
    }

    #[test]
    fn test_bad_token_fails_whole_command() {
        let (handler, tx) = setup();
        let outcome = handler.send_command("sendIRcmd/12,abc,34");
        assert_eq!(
            outcome,
            CommandOutcome::ParseFailed(CommandParseError::InvalidNumber {
                index: 1,
                token: "abc".into()
            })
        );
        assert_eq!(outcome.body(), "IR cmd failed");
        assert_eq!(tx.count(), 0);
    }

    #[test]
    fn test_transmit_failure_keeps_status_ok() {
        let tx = Arc::new(RecordingTransmitter::failing(TransmitError::Hardware(
            "busy".into(),
        )));
        let handler = CommandHandler::new(tx.clone());

        let outcome = handler.send_command("sendIRcmd/1,2");
        assert_eq!(
            outcome,
            CommandOutcome::TransmitFailed(TransmitError::Hardware("busy".into()))
        );
        assert!(!outcome.is_sent());

        let response = handler.dispatch("sendIRcmd/1,2").into_response();
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.body(), b"IR cmd failed");
    }

    #[test]
    fn test_unmatched_routes_are_server_errors() {
        let (handler, _) = setup();
        for route in ["foo/bar", "favicon.ico", "index.html"] {
            assert_eq!(handler.dispatch(route), RouteOutcome::NotFound);
            let response = handler.dispatch(route).into_response();
            assert_eq!(response.status(), StatusCode::InternalServerError);
            assert!(response.body().is_empty());
        }
    }

    #[test]
    fn test_command_payload() {
        assert_eq!(command_payload("sendIRcmd/1,2"), "1,2");
        assert_eq!(command_payload("a/b/sendIRcmd/3"), "3");
        assert_eq!(command_payload("sendIRcmd/"), "");
        assert_eq!(command_payload("sendIRcmd"), "sendIRcmd");
    }
}
