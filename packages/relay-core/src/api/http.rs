//! Route handlers.
//!
//! - `GET /api/events` — server-sent-events stream of receiver events
//! - `POST /api/command` — forward a plain-text command to the receiver
//! - anything else — 404 with a JSON body

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use futures::StreamExt;
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::device::Command;
use crate::error::{RelayError, RelayResult};

use super::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/events", get(subscribe_events))
        .route("/api/command", post(post_command))
        .fallback(route_not_found)
        .with_state(state)
}

/// Opens a server-sent-events stream of receiver events.
///
/// Registration keys on the caller's origin address, so a reconnecting
/// viewer replaces its stale stream instead of accumulating one per attempt.
/// The stream owns the registry guard: when the client goes away and axum
/// drops the body, the guard deregisters the viewer.
async fn subscribe_events(
    State(state): State<AppState>,
    ConnectInfo(remote_addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> RelayResult<Response> {
    let origin = origin_address(&headers, remote_addr);
    log::info!("[Api] Viewer {} subscribed to the event stream", origin);

    let (guard, rx) = state.registry.register(&origin);
    let stream = UnboundedReceiverStream::new(rx).map(move |frame| {
        let _guard = &guard;
        Ok::<_, Infallible>(frame)
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "keep-alive")
        .body(Body::from_stream(stream))
        .map_err(|e| RelayError::Internal(e.to_string()))
}

/// Parses the plain-text body and forwards the command to the receiver.
///
/// An unrecognized body is rejected with 400 before any receiver traffic
/// happens. Success is 204 with no body; state changes reach viewers through
/// the event stream, not through this response.
async fn post_command(State(state): State<AppState>, body: String) -> RelayResult<StatusCode> {
    let command =
        Command::parse(&body).ok_or_else(|| RelayError::UnknownCommand(body.clone()))?;
    log::info!("[Api] Forwarding {:?} to the receiver", command);
    command.execute(&*state.device).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Route not found" })),
    )
}

/// The address a viewer stream is keyed on.
///
/// Behind a proxy the socket address is the proxy's, so the last entry of
/// `x-forwarded-for` (the hop closest to us) wins when present.
fn origin_address(headers: &HeaderMap, remote_addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next_back())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| remote_addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;
    use crate::device::DeviceError;
    use crate::relay::ClientRegistry;
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::Request;
    use bytes::Bytes;
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn test_app(device: MockDevice) -> (Router, Arc<MockDevice>) {
        let device = Arc::new(device);
        let registry = Arc::new(ClientRegistry::new(device.clone()));
        let state = AppState {
            device: device.clone(),
            registry,
        };
        let app = create_router(state)
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 52000))));
        (app, device)
    }

    async fn body_json(response: Response) -> Value {
        let mut stream = response.into_body().into_data_stream();
        let mut bytes = Vec::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk.unwrap());
        }
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn origin_address_prefers_the_last_forwarded_hop() {
        let remote = SocketAddr::from(([10, 0, 0, 1], 40000));

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.2".parse().unwrap());
        assert_eq!(origin_address(&headers, remote), "10.0.0.2");

        headers.insert("x-forwarded-for", "203.0.113.7".parse().unwrap());
        assert_eq!(origin_address(&headers, remote), "203.0.113.7");
    }

    #[test]
    fn origin_address_falls_back_to_the_socket_address() {
        let remote = SocketAddr::from(([10, 0, 0, 1], 40000));
        assert_eq!(origin_address(&HeaderMap::new(), remote), "10.0.0.1");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "".parse().unwrap());
        assert_eq!(origin_address(&headers, remote), "10.0.0.1");
    }

    #[tokio::test]
    async fn known_command_returns_no_content() {
        let (app, device) = test_app(MockDevice::new());

        let response = app
            .oneshot(
                Request::post("/api/command")
                    .body(Body::from("volumeup"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let paths = device.paths();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].contains("setVolume?volume=up"));
    }

    #[tokio::test]
    async fn unknown_command_is_rejected_without_receiver_traffic() {
        let (app, device) = test_app(MockDevice::new());

        let response = app
            .oneshot(
                Request::post("/api/command")
                    .body(Body::from("makecoffee"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(device.paths().is_empty());

        let body = body_json(response).await;
        assert_eq!(body["message"], "Unknown command: makecoffee");
    }

    #[tokio::test]
    async fn unreachable_receiver_yields_service_unavailable() {
        let (app, _device) = test_app(MockDevice::with_responses(vec![Err(
            DeviceError::Timeout,
        )]));

        let response = app
            .oneshot(
                Request::post("/api/command")
                    .body(Body::from("togglepower"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(
            body["message"],
            "Took too long while communicating with the receiver"
        );
    }

    #[tokio::test]
    async fn unknown_routes_get_a_json_404() {
        let (app, _device) = test_app(MockDevice::new());

        let response = app
            .oneshot(Request::get("/api/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "message": "Route not found" }));
    }

    #[tokio::test]
    async fn event_stream_has_sse_headers_and_opens_with_connected() {
        let (app, _device) = test_app(MockDevice::new());

        let response = app
            .oneshot(Request::get("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert_eq!(headers[CONNECTION], "keep-alive");

        let mut stream = response.into_body().into_data_stream();
        let first: Bytes = stream.next().await.unwrap().unwrap();
        let text = std::str::from_utf8(&first).unwrap();
        let json = text
            .strip_prefix("data: ")
            .and_then(|t| t.strip_suffix("\n\n"))
            .unwrap();
        let frame: Value = serde_json::from_str(json).unwrap();
        assert_eq!(frame, json!({ "tag": "connected", "data": null }));
    }
}
