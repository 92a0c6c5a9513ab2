//! HTTP surface: the event stream and the command endpoint.

pub mod http;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::device::DeviceClient;
use crate::relay::ClientRegistry;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub device: Arc<dyn DeviceClient>,
    pub registry: Arc<ClientRegistry>,
}

/// Serves the API on an already-bound listener until the task is aborted.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = http::create_router(state);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
