//! Operator console entry point
//!
//! Connects to the apparatus backend, mirrors live telemetry, and logs
//! operator-facing updates. Rendering lives elsewhere; this binary is the
//! headless core plus a line-oriented view of its update stream.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};

use console::{
    CommandPolicy, Console, ConsoleConfig, ConsoleUpdate, HttpCommandGateway, ReconnectPolicy,
    WsTelemetryChannel,
};

#[derive(Parser, Debug)]
#[command(name = "console")]
#[command(about = "Operator console for the dual-portal apparatus")]
struct Args {
    /// Backend base URL (http or https); falls back to BACKEND_URL from the
    /// environment or .env file
    #[arg(long)]
    backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Reconnect with bounded exponential backoff after a telemetry drop
    #[arg(long)]
    reconnect: bool,

    /// Maximum reconnect attempts per drop
    #[arg(long, default_value = "6")]
    reconnect_attempts: u32,

    /// Per-command timeout in seconds; commands wait indefinitely when unset
    #[arg(long)]
    command_timeout_secs: Option<u64>,

    /// Command attempts when a timeout is configured
    #[arg(long, default_value = "3")]
    command_attempts: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    shared::logging::init_tracing(Some(&args.log_level));

    let backend_url = args
        .backend_url
        .clone()
        .or_else(|| std::env::var("BACKEND_URL").ok())
        .unwrap_or_else(|| "http://localhost:8080".to_string());

    let mut config = ConsoleConfig::new(&backend_url).context("invalid backend URL")?;
    if args.reconnect {
        config = config.with_reconnect(ReconnectPolicy::ExponentialBackoff {
            initial: Duration::from_secs(1),
            max: Duration::from_secs(30),
            max_attempts: args.reconnect_attempts,
        });
    }
    if let Some(secs) = args.command_timeout_secs {
        config = config.with_command_policy(CommandPolicy::TimeoutRetry {
            timeout: Duration::from_secs(secs),
            max_attempts: args.command_attempts,
        });
    }

    info!("connecting to apparatus at {}", config.backend_url);

    let telemetry = WsTelemetryChannel::with_policy(config.websocket_url(), config.reconnect.clone());
    let gateway = HttpCommandGateway::with_policy(&config.backend_url, config.command_policy.clone());
    let console = Arc::new(Console::new(telemetry, gateway));

    // Line-oriented view of the operator update stream.
    let mut updates = console.subscribe();
    tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(update) => log_update(update),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("operator view lagging, {skipped} updates skipped");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let runner = {
        let console = console.clone();
        tokio::spawn(async move { console.run().await })
    };

    tokio::select! {
        result = runner => {
            result.context("telemetry loop panicked")??;
            info!("telemetry channel ended");
        }
        _ = signal::ctrl_c() => {
            info!("shutting down");
            console.shutdown().await?;
        }
    }

    Ok(())
}

fn log_update(update: ConsoleUpdate) {
    match update {
        ConsoleUpdate::ConnectionChanged { connected } => {
            info!("telemetry {}", if connected { "connected" } else { "disconnected" });
        }
        ConsoleUpdate::Snapshot(state) => {
            info!(
                status = %state.status,
                bridge_strength = state.bridge.strength,
                detune = state.bridge.detune,
                "snapshot"
            );
        }
        ConsoleUpdate::LockChanged {
            portal,
            transport_ready,
            ..
        } => {
            info!("{portal} locked (transport ready: {transport_ready})");
        }
        ConsoleUpdate::SweepCompleted {
            candidates,
            best_strength,
        } => {
            info!("sweep finished: {candidates} candidates, best {best_strength:?}");
        }
        ConsoleUpdate::TransferAttempted {
            accepted,
            bridge_strength,
        } => {
            info!("transfer {} at strength {bridge_strength:.2}", if accepted { "accepted" } else { "refused" });
        }
        ConsoleUpdate::PayloadCommitted { portal } => {
            info!("payload committed to {portal}");
        }
        ConsoleUpdate::SessionReset { run_id } => {
            info!("session reset, run {}", run_id.as_deref().unwrap_or("unknown"));
        }
        ConsoleUpdate::CommandError { command, message } => {
            warn!("{command}: {message}");
        }
    }
}
