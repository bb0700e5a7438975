//! chatvisor console client.
//!
//! Chat lines go to stdout, status updates and logs to stderr; every line
//! typed on stdin is sent to the chat. With `--message` the binary sends that
//! one message and exits.

use std::io::BufRead;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use chatvisor::{Cli, Client, PresenterPorts, RuntimeError};

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    setup_logging(cli.debug);

    let message = cli.message.clone();
    let cfg = match cli.into_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    if let Some(message) = message {
        return match Client::new(cfg).send_once(&message).await {
            Ok(account) => {
                info!(nickname = %account.nickname, "message sent");
                ExitCode::SUCCESS
            }
            Err(e) => exit_code(e),
        };
    }

    let (engine, presenter) = chatvisor::channel();
    tokio::spawn(present(presenter));

    match Client::new(cfg).run(engine).await {
        Ok(()) => {
            info!("shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => exit_code(e),
    }
}

/// 2 for a rejected token, 3 for a broken handshake, 1 for anything else.
fn exit_code(e: RuntimeError) -> ExitCode {
    match e {
        RuntimeError::Unauthorized => {
            eprintln!("Authorization failed: {} (TOKEN / --token).", e.as_message());
            ExitCode::from(2)
        }
        RuntimeError::Protocol { .. } => {
            eprintln!("The server answered the handshake with something unexpected: {}", e.as_message());
            ExitCode::from(3)
        }
        e => {
            error!(kind = e.as_label(), error = %e.as_message(), "client failed");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; `debug` raises the default level, `RUST_LOG` overrides both.
fn setup_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Minimal console presentation loop.
async fn present(ports: PresenterPorts) {
    let PresenterPorts {
        mut inbound,
        outbound,
        mut status,
    } = ports;

    // A detached thread, so a pending stdin read never holds up runtime shutdown.
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            if outbound.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            line = inbound.recv() => match line {
                Some(line) => print!("{line}"),
                None => break,
            },
            ev = status.recv() => match ev {
                Some(ev) => eprintln!("{ev}"),
                None => break,
            },
        }
    }
}
