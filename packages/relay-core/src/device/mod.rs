//! Receiver-facing protocol: control calls, status snapshots, command
//! forwarding and the event-subscription lease.

mod client;
mod commands;
mod status;
mod subscription;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{DeviceClient, DeviceError, DeviceLink, DeviceResult};
pub use commands::Command;
pub use status::DeviceStatus;
pub use subscription::SubscriptionLease;
