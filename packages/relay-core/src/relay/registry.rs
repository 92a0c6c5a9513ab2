//! Viewer connection registry and event broadcaster.
//!
//! The registry is the relay's only shared mutable state. Mutations go
//! through `register`/`deregister`/`broadcast`/`close_all` exclusively, and
//! the inner map is guarded by a single mutex - the real-threads equivalent
//! of the reference implementation's single-writer event loop.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::device::DeviceClient;
use crate::events::TaggedEvent;

/// A registered viewer stream.
struct ViewerConnection {
    id: u64,
    tx: mpsc::UnboundedSender<Bytes>,
}

/// Tracks subscribed viewer streams, one per origin address, and fans
/// events out to all of them.
pub struct ClientRegistry {
    device: Arc<dyn DeviceClient>,
    connections: Mutex<HashMap<String, ViewerConnection>>,
    next_id: AtomicU64,
}

impl ClientRegistry {
    /// Creates an empty registry. The device client is used for the
    /// best-effort status seed on registration.
    pub fn new(device: Arc<dyn DeviceClient>) -> Self {
        Self {
            device,
            connections: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a viewer stream for `origin`, replacing (and thereby
    /// closing) any previous stream from the same address.
    ///
    /// The `connected` frame is written before the entry becomes visible to
    /// broadcasts, so it is always the first frame on the stream. Current
    /// receiver status is then pushed from a background task: a `status`
    /// frame on success, an `error` frame on failure. Registration never
    /// waits on the receiver.
    ///
    /// The returned guard deregisters the connection when the response
    /// stream is dropped; it carries the connection id so a stale guard from
    /// a replaced connection never removes the live entry.
    pub fn register(
        self: &Arc<Self>,
        origin: &str,
    ) -> (ViewerGuard, mpsc::UnboundedReceiver<Bytes>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        let _ = tx.send(TaggedEvent::Connected.to_sse_frame());
        let seed_tx = tx.clone();

        {
            let mut connections = self.connections.lock();
            if connections
                .insert(origin.to_string(), ViewerConnection { id, tx })
                .is_some()
            {
                log::info!("[Registry] Replacing existing stream for {}", origin);
            }
            log::info!(
                "[Registry] {} viewer(s) subscribed to receiver events",
                connections.len()
            );
        }

        let device = Arc::clone(&self.device);
        tokio::spawn(async move {
            let event = match device.status().await {
                Ok(status) => TaggedEvent::Status(status),
                Err(e) => TaggedEvent::Error(e.to_string()),
            };
            // The viewer may have been replaced or have left already
            let _ = seed_tx.send(event.to_sse_frame());
        });

        let guard = ViewerGuard {
            origin: origin.to_string(),
            id,
            registry: Arc::clone(self),
        };
        (guard, rx)
    }

    /// Removes the entry for `origin` if it still belongs to connection
    /// `id`. Safe to call for already-replaced or already-removed entries.
    fn deregister(&self, origin: &str, id: u64) {
        let mut connections = self.connections.lock();
        if connections.get(origin).is_some_and(|c| c.id == id) {
            connections.remove(origin);
            log::info!(
                "[Registry] Viewer left, {} still subscribed",
                connections.len()
            );
        }
    }

    /// Writes the event to every registered stream, in arrival order.
    ///
    /// The frame is encoded once. A failed write on one stream (viewer
    /// mid-disconnect) is logged and never blocks delivery to the others.
    pub fn broadcast(&self, event: &TaggedEvent) {
        let frame = event.to_sse_frame();
        let connections = self.connections.lock();
        log::info!(
            "[Registry] Sending {} event to {} viewer(s)",
            event.tag(),
            connections.len()
        );
        for (origin, connection) in connections.iter() {
            if connection.tx.send(frame.clone()).is_err() {
                log::warn!("[Registry] Dropping event for disconnected viewer {}", origin);
            }
        }
    }

    /// Ends every viewer stream and clears the registry (shutdown path).
    pub fn close_all(&self) {
        let mut connections = self.connections.lock();
        let count = connections.len();
        connections.clear();
        if count > 0 {
            log::info!("[Registry] Closed {} viewer stream(s)", count);
        }
    }

    /// Number of currently registered viewers.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }
}

/// RAII guard that deregisters a viewer when its response stream is dropped.
pub struct ViewerGuard {
    origin: String,
    id: u64,
    registry: Arc<ClientRegistry>,
}

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        self.registry.deregister(&self.origin, self.id);
    }
}
