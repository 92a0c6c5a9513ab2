//! UDP ingestion of receiver event notifications.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;

use crate::device::DeviceClient;
use crate::events::{normalize, TaggedEvent};
use crate::protocol::EVENT_DATAGRAM_BUFFER_SIZE;
use crate::relay::ClientRegistry;

/// Listens for receiver event datagrams and pushes the normalized events
/// through the registry.
pub struct EventIngester {
    socket: UdpSocket,
    registry: Arc<ClientRegistry>,
    device: Arc<dyn DeviceClient>,
}

impl EventIngester {
    /// Binds the event socket. The port must match what the subscription
    /// lease announces to the receiver, so a bind failure is fatal for the
    /// caller.
    pub async fn bind(
        addr: SocketAddr,
        registry: Arc<ClientRegistry>,
        device: Arc<dyn DeviceClient>,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        log::info!(
            "[Ingester] Listening for receiver events on {}",
            socket.local_addr()?
        );
        Ok(Self {
            socket,
            registry,
            device,
        })
    }

    /// Address the socket actually bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Receives datagrams until cancelled, then closes all viewer streams.
    ///
    /// Datagrams are processed one at a time. The occasional inline status
    /// query (mute compensation) holds up the next receive, which is what
    /// guarantees the synthesized power event lands after its mute event
    /// on every viewer stream.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut buf = vec![0u8; EVENT_DATAGRAM_BUFFER_SIZE];
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("[Ingester] Shutting down, closing viewer streams");
                    self.registry.close_all();
                    return;
                }
                received = self.socket.recv_from(&mut buf) => {
                    match received {
                        Ok((len, _peer)) => {
                            process_datagram(&self.registry, &*self.device, &buf[..len]).await;
                        }
                        Err(e) => {
                            log::warn!("[Ingester] Receive failed: {}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Handles one raw datagram: decode, normalize, broadcast, compensate.
///
/// Undecodable payloads are logged and discarded; the stream of future
/// datagrams is unaffected. Events that match no known field are logged at
/// debug level and never broadcast.
///
/// Unmute gets special treatment: the receiver reports an automatic power-on
/// as a bare `mute: false` notification, so after broadcasting the mute
/// event the current status is queried and a power event (or an error event,
/// if the query fails) is synthesized for viewers.
pub(crate) async fn process_datagram(
    registry: &ClientRegistry,
    device: &dyn DeviceClient,
    payload: &[u8],
) {
    let text = match std::str::from_utf8(payload) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("[Ingester] Discarding non-UTF-8 event payload: {}", e);
            return;
        }
    };

    let body: serde_json::Value = match serde_json::from_str(text) {
        Ok(body) => body,
        Err(e) => {
            log::warn!("[Ingester] Could not parse event: {}", e);
            return;
        }
    };

    let event = normalize(&body);
    if let TaggedEvent::Unknown(raw) = &event {
        log::debug!("[Ingester] Ignoring unrecognized event: {}", raw);
        return;
    }

    registry.broadcast(&event);

    if event == TaggedEvent::Mute(false) {
        let follow_up = match device.status().await {
            Ok(status) => TaggedEvent::Power(status.is_power_on),
            Err(e) => TaggedEvent::Error(e.to_string()),
        };
        registry.broadcast(&follow_up);
    }
}
