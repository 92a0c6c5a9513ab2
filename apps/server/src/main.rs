//! Relay Server - Headless event relay for a MusicCast receiver.
//!
//! Subscribes to a Yamaha MusicCast receiver's event notifications, fans
//! them out to browser viewers over server-sent events and forwards remote
//! control commands back to the receiver.

mod config;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use relay_core::{serve, AppState, ClientRegistry, DeviceLink, EventIngester, SubscriptionLease};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Relay Server - MusicCast receiver event relay and remote control.
#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (YAML).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(short, long, default_value = "info", env = "RELAY_LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// Receiver IP address (overrides config file).
    #[arg(short = 'd', long, env = "RELAY_DEVICE_IP")]
    device_ip: Option<IpAddr>,

    /// Local IP the receiver sends events to (overrides config file).
    #[arg(short = 'a', long, env = "RELAY_LOCAL_IP")]
    local_ip: Option<IpAddr>,

    /// UDP event port (overrides config file).
    #[arg(short = 'e', long, env = "RELAY_EVENT_PORT")]
    event_port: Option<u16>,

    /// HTTP API port (overrides config file).
    #[arg(short = 'p', long, env = "RELAY_HTTP_PORT")]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    log::info!("Relay Server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let mut config =
        ServerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(ip) = args.device_ip {
        config.device_ip = Some(ip);
    }
    if let Some(ip) = args.local_ip {
        config.local_ip = Some(ip);
    }
    if let Some(port) = args.event_port {
        config.event_port = port;
    }
    if let Some(port) = args.http_port {
        config.http_port = port;
    }

    let Some(device_ip) = config.device_ip else {
        bail!(
            "No receiver address configured. \
             Please specify --device-ip or set RELAY_DEVICE_IP to the IP \
             address of the MusicCast receiver."
        );
    };

    // Resolve the local IP: use explicit config, or fall back to auto-detection
    let local_ip = match config.local_ip {
        Some(ip) => ip,
        None => local_ip_address::local_ip().context(
            "Failed to auto-detect local IP address. \
             Please specify --local-ip or set RELAY_LOCAL_IP to the IP \
             address the receiver can reach.",
        )?,
    };

    log::info!(
        "Configuration: device_ip={}, local_ip={}, event_port={}, http_port={}",
        device_ip,
        local_ip,
        config.event_port,
        config.http_port
    );

    let device = Arc::new(DeviceLink::new(device_ip, Some(local_ip))?);
    let registry = Arc::new(ClientRegistry::new(device.clone()));

    // The event socket must bind before the lease announces its port to the
    // receiver. A conflict here is fatal.
    let ingester = EventIngester::bind(
        SocketAddr::new(local_ip, config.event_port),
        registry.clone(),
        device.clone(),
    )
    .await
    .with_context(|| format!("Event port {} not available", config.event_port))?;
    let event_port = ingester.local_addr()?.port();

    let lease = SubscriptionLease::new(device.clone(), event_port);
    tokio::spawn(lease.run());

    let shutdown = CancellationToken::new();
    let ingester_handle = tokio::spawn(ingester.run(shutdown.clone()));

    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], config.http_port)))
        .await
        .with_context(|| format!("HTTP port {} not available", config.http_port))?;
    log::info!("HTTP API listening on {}", listener.local_addr()?);

    let state = AppState { device, registry };
    let server_handle = tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            log::error!("Server error: {}", e);
        }
    });

    // Wait for shutdown signal
    shutdown_signal().await;

    log::info!("Shutdown signal received, cleaning up...");

    // Stop taking datagrams and close every viewer stream, then drop the
    // HTTP server.
    shutdown.cancel();
    let _ = ingester_handle.await;
    server_handle.abort();

    log::info!("Shutdown complete");
    Ok(())
}

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
