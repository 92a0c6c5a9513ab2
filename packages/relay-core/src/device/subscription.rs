//! Event-subscription lease renewal.
//!
//! The receiver only pushes UDP notifications to listeners that have
//! recently announced themselves, so the relay must re-announce for as long
//! as it runs. The lease is fire-and-forget: failures are logged and the
//! next announce happens on schedule anyway - the receiver is routinely
//! unreachable (powered off at the wall).

use std::sync::Arc;
use std::time::Duration;

use tokio::time;

use super::client::{DeviceClient, DeviceResult};
use crate::protocol::{
    DEVICE_API_ROOT, HEADER_APP_NAME, HEADER_APP_PORT, SUBSCRIBE_APP_NAME, SUBSCRIBE_INTERVAL_SECS,
};

/// Keeps the receiver sending event notifications to our UDP port.
pub struct SubscriptionLease {
    device: Arc<dyn DeviceClient>,
    listen_port: u16,
}

impl SubscriptionLease {
    /// Creates a lease for the given listening port. Start it only after
    /// the event socket has bound successfully.
    pub fn new(device: Arc<dyn DeviceClient>, listen_port: u16) -> Self {
        Self {
            device,
            listen_port,
        }
    }

    /// Runs the announce loop for the process lifetime.
    ///
    /// Announces immediately, then on a fixed interval kept strictly
    /// shorter than the receiver's own subscription timeout. No backoff,
    /// no jitter, no escalation.
    pub async fn run(self) {
        let mut ticker = time::interval(Duration::from_secs(SUBSCRIBE_INTERVAL_SECS));
        loop {
            ticker.tick().await;
            match self.announce().await {
                Ok(()) => log::info!(
                    "[Lease] Subscribed to receiver events on port {}",
                    self.listen_port
                ),
                Err(e) => log::error!("[Lease] Could not subscribe to receiver events: {}", e),
            }
        }
    }

    /// Single announce call carrying our application identity and UDP port.
    /// The response body is not meaningful, so its response code is ignored.
    async fn announce(&self) -> DeviceResult<()> {
        self.device
            .query(
                DEVICE_API_ROOT,
                &[
                    (HEADER_APP_NAME, SUBSCRIBE_APP_NAME.to_string()),
                    (HEADER_APP_PORT, self.listen_port.to_string()),
                ],
                true,
            )
            .await?;
        Ok(())
    }
}
