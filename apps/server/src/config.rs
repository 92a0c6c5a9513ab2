//! Server configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::net::IpAddr;
use std::path::Path;

use anyhow::{Context, Result};
use relay_core::protocol::{DEFAULT_EVENT_PORT, DEFAULT_HTTP_PORT};
use serde::Deserialize;

/// Server configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address of the MusicCast receiver. Required.
    /// Override: `RELAY_DEVICE_IP`
    pub device_ip: Option<IpAddr>,

    /// Local IP address the receiver can reach for event delivery.
    /// If not specified, auto-detection will be attempted.
    /// Override: `RELAY_LOCAL_IP`
    pub local_ip: Option<IpAddr>,

    /// UDP port to receive receiver event notifications on.
    /// Override: `RELAY_EVENT_PORT`
    pub event_port: u16,

    /// Port to bind the HTTP API to.
    /// Override: `RELAY_HTTP_PORT`
    pub http_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            device_ip: None,
            local_ip: None,
            event_port: DEFAULT_EVENT_PORT,
            http_port: DEFAULT_HTTP_PORT,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("RELAY_DEVICE_IP") {
            if let Ok(ip) = val.parse() {
                self.device_ip = Some(ip);
            }
        }

        if let Ok(val) = std::env::var("RELAY_LOCAL_IP") {
            if let Ok(ip) = val.parse() {
                self.local_ip = Some(ip);
            }
        }

        if let Ok(val) = std::env::var("RELAY_EVENT_PORT") {
            if let Ok(port) = val.parse() {
                self.event_port = port;
            }
        }

        if let Ok(val) = std::env::var("RELAY_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                self.http_port = port;
            }
        }
    }
}
