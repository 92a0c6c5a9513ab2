//! HTTP client for the receiver's Extended Control API.
//!
//! This module handles the raw transport: one GET per call, a fixed timeout,
//! and the application-level response-code check. Retry policy belongs to
//! callers; there is none here.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use super::status::DeviceStatus;
use crate::protocol::{
    DEVICE_TIMEOUT_SECS, MUSICCAST_ACCEPT, OK_RESPONSE_CODE, RELAY_USER_AGENT, STATUS_PATH,
};

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur when calling the receiver.
#[derive(Debug, Error)]
pub enum DeviceError {
    /// The receiver did not respond within the fixed timeout.
    #[error("Took too long while communicating with the receiver")]
    Timeout,

    /// Socket-level failure reaching the receiver.
    #[error("Error while communicating with the receiver: {0}")]
    Transport(String),

    /// The receiver replied with a body that is not valid JSON.
    #[error("Invalid response from the receiver: {0}")]
    InvalidBody(String),

    /// The receiver replied with a non-ok application response code.
    #[error("Non successful response code from the receiver ({0})")]
    ResponseCode(i64),
}

/// Convenient Result alias for receiver calls.
pub type DeviceResult<T> = Result<T, DeviceError>;

impl From<reqwest::Error> for DeviceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Outbound control/query calls to the receiver.
///
/// This is the seam between relay logic and the HTTP transport; tests
/// substitute a recording mock.
#[async_trait]
pub trait DeviceClient: Send + Sync {
    /// Issues a single GET to the control API and decodes the JSON body.
    ///
    /// Succeeds only when the body's `response_code` equals the ok sentinel,
    /// unless `ignore_response_code` is set - used exclusively by the
    /// subscription announce, whose body is not meaningful.
    async fn query(
        &self,
        path: &str,
        extra_headers: &[(&'static str, String)],
        ignore_response_code: bool,
    ) -> DeviceResult<Value>;

    /// Queries the main-zone status and converts it to a snapshot.
    async fn status(&self) -> DeviceResult<DeviceStatus> {
        let body = self.query(STATUS_PATH, &[], false).await?;
        Ok(DeviceStatus::from_raw(&body))
    }
}

/// reqwest-backed [`DeviceClient`].
pub struct DeviceLink {
    client: Client,
    base_url: String,
}

impl DeviceLink {
    /// Creates a client for the receiver at `device_ip`.
    ///
    /// Outbound requests are bound to `local_ip` when given, so the receiver
    /// sees the same source address that event datagrams are delivered to.
    pub fn new(device_ip: IpAddr, local_ip: Option<IpAddr>) -> DeviceResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(MUSICCAST_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(RELAY_USER_AGENT));

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(DEVICE_TIMEOUT_SECS));
        if let Some(ip) = local_ip {
            builder = builder.local_address(ip);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: format!("http://{device_ip}"),
        })
    }
}

#[async_trait]
impl DeviceClient for DeviceLink {
    async fn query(
        &self,
        path: &str,
        extra_headers: &[(&'static str, String)],
        ignore_response_code: bool,
    ) -> DeviceResult<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        for (name, value) in extra_headers {
            request = request.header(*name, value);
        }

        log::debug!("[Device] GET {}", url);
        let response = request.send().await?;
        let text = response.text().await?;

        let body: Value =
            serde_json::from_str(&text).map_err(|e| DeviceError::InvalidBody(e.to_string()))?;

        if !ignore_response_code {
            let code = body
                .get("response_code")
                .and_then(Value::as_i64)
                .unwrap_or(-1);
            if code != OK_RESPONSE_CODE {
                return Err(DeviceError::ResponseCode(code));
            }
        }

        Ok(body)
    }
}
