//! Viewer command forwarding.
//!
//! Commands arrive as plain-text bodies on the HTTP API and map to single
//! Extended Control calls. The toggles read current status first because
//! the receiver only exposes absolute setters.

use super::client::{DeviceClient, DeviceResult};
use crate::protocol::{
    POWER_ON, POWER_STANDBY, PRIMARY_INPUT, SET_INPUT_PATH, SET_MUTE_PATH, SET_POWER_PATH,
    SET_VOLUME_PATH,
};

/// A recognized viewer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    VolumeUp,
    VolumeDown,
    ToggleMute,
    InputTv,
    TogglePower,
}

impl Command {
    /// Parses a plain-text command body. Unrecognized input yields `None`
    /// and must not result in any receiver call.
    pub fn parse(body: &str) -> Option<Self> {
        match body {
            "volumeup" => Some(Self::VolumeUp),
            "volumedown" => Some(Self::VolumeDown),
            "togglemute" => Some(Self::ToggleMute),
            "inputtv" => Some(Self::InputTv),
            "togglepower" => Some(Self::TogglePower),
            _ => None,
        }
    }

    /// Executes the command against the receiver.
    pub async fn execute(self, device: &dyn DeviceClient) -> DeviceResult<()> {
        match self {
            Self::VolumeUp => {
                device
                    .query(&format!("{SET_VOLUME_PATH}?volume=up&step=2"), &[], false)
                    .await?;
            }
            Self::VolumeDown => {
                device
                    .query(&format!("{SET_VOLUME_PATH}?volume=down&step=2"), &[], false)
                    .await?;
            }
            Self::ToggleMute => {
                let status = device.status().await?;
                device
                    .query(
                        &format!("{SET_MUTE_PATH}?enable={}", !status.is_muted),
                        &[],
                        false,
                    )
                    .await?;
            }
            Self::InputTv => {
                device
                    .query(&format!("{SET_INPUT_PATH}?input={PRIMARY_INPUT}"), &[], false)
                    .await?;
            }
            Self::TogglePower => {
                let status = device.status().await?;
                let power = if status.is_power_on {
                    POWER_STANDBY
                } else {
                    POWER_ON
                };
                device
                    .query(&format!("{SET_POWER_PATH}?power={power}"), &[], false)
                    .await?;
            }
        }
        Ok(())
    }
}
