//! Receiver status snapshots.

use serde::Serialize;
use serde_json::Value;

use crate::protocol::{POWER_ON, PRIMARY_INPUT};

/// Point-in-time status of the receiver's main zone.
///
/// Derived on demand from a getStatus query and immediately turned into an
/// event or HTTP response; never cached beyond a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatus {
    pub is_power_on: bool,
    pub is_input_tv: bool,
    pub is_muted: bool,
    pub volume: u64,
}

impl DeviceStatus {
    /// Converts a raw getStatus body into a snapshot.
    ///
    /// Fields the receiver omits (zone/firmware dependent) default to
    /// powered off, non-TV input, unmuted, volume 0.
    pub fn from_raw(body: &Value) -> Self {
        Self {
            is_power_on: body.get("power").and_then(Value::as_str) == Some(POWER_ON),
            is_input_tv: body.get("input").and_then(Value::as_str) == Some(PRIMARY_INPUT),
            is_muted: body.get("mute").and_then(Value::as_bool).unwrap_or(false),
            volume: body.get("volume").and_then(Value::as_u64).unwrap_or(0),
        }
    }
}
