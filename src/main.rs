//! irbridge - Infrared Remote Control over HTTP
//!
//! This is the main entry point for the irbridge server.
//! It parses the command line, sets up logging, and runs the server until
//! Ctrl+C.

use irbridge::server::{Server, ServerConfig};
use irbridge::transmit::LogTransmitter;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Serve(ServerConfig),
    Help,
    Version,
}

/// Parse command-line arguments (without the program name).
///
/// `-h` is help, as in most CLIs; the host takes `-H`.
fn parse_args<I>(args: I) -> Result<Invocation, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = ServerConfig::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" | "-H" => {
                config.host = args.next().ok_or("--host requires a value")?;
            }
            "--port" | "-p" => {
                let value = args.next().ok_or("--port requires a value")?;
                config.port = value
                    .parse()
                    .map_err(|_| format!("invalid port number: {}", value))?;
            }
            "--help" | "-h" => return Ok(Invocation::Help),
            "--version" | "-v" => return Ok(Invocation::Version),
            _ => return Err(format!("unknown argument: {}", arg)),
        }
    }

    Ok(Invocation::Serve(config))
}

/// Parse configuration from the process arguments, exiting on help,
/// version or bad input
fn config_from_args() -> ServerConfig {
    match parse_args(std::env::args().skip(1)) {
        Ok(Invocation::Serve(config)) => config,
        Ok(Invocation::Help) => {
            print_help();
            std::process::exit(0);
        }
        Ok(Invocation::Version) => {
            println!("irbridge version {}", irbridge::VERSION);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    }
}

fn print_help() {
    println!(
        r#"
irbridge - Infrared Remote Control over HTTP

USAGE:
    irbridge [OPTIONS]

OPTIONS:
    -H, --host <HOST>    Host to bind to (default: 0.0.0.0)
    -p, --port <PORT>    Port to listen on (default: 8080)
    -v, --version        Print version information
    -h, --help           Print this help message

ROUTES:
    GET /                            Hello World
    GET /sendIRcmd/<v1,v2,...>       Transmit v[i] * 26.3 us pulses at 38 kHz

EXAMPLES:
    irbridge                         # Listen on 0.0.0.0:8080
    irbridge --port 9090             # Listen on port 9090
    curl http://localhost:8080/sendIRcmd/342,171,21,64,21,21

LOGGING:
    Set RUST_LOG (e.g. RUST_LOG=debug) to change verbosity.
"#
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = config_from_args();

    // Set up logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    info!(version = irbridge::VERSION, "Starting irbridge");

    // No hardware driver is linked in; pulse trains go to the log
    let transmitter = Arc::new(LogTransmitter::new());
    let mut server = Server::new(config, transmitter);
    let addr = server.start().await?;
    info!("Ready for IR commands on http://{}/sendIRcmd/", addr);

    signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping server...");
    server.stop().await;

    let stats = server.stats();
    info!(
        connections = stats.connections_handled.load(Ordering::Relaxed),
        sent = stats.commands_sent.load(Ordering::Relaxed),
        failed = stats.commands_failed.load(Ordering::Relaxed),
        bytes_written = stats.bytes_written.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Invocation, String> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args_serves_defaults() {
        assert_eq!(parse(&[]), Ok(Invocation::Serve(ServerConfig::default())));
    }

    #[test]
    fn test_short_h_is_help() {
        assert_eq!(parse(&["-h"]), Ok(Invocation::Help));
        assert_eq!(parse(&["--help"]), Ok(Invocation::Help));
    }

    #[test]
    fn test_host_and_port() {
        let expected = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 9090,
        };
        assert_eq!(
            parse(&["-H", "127.0.0.1", "-p", "9090"]),
            Ok(Invocation::Serve(expected.clone()))
        );
        assert_eq!(
            parse(&["--port", "9090", "--host", "127.0.0.1"]),
            Ok(Invocation::Serve(expected))
        );
    }

    #[test]
    fn test_bad_arguments() {
        assert!(parse(&["--port", "http"]).is_err());
        assert!(parse(&["--port"]).is_err());
        assert!(parse(&["-H"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
    }

    #[test]
    fn test_version() {
        assert_eq!(parse(&["-v"]), Ok(Invocation::Version));
    }
}
