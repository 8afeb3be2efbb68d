use std::path::PathBuf;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::hub::{display_name, JOIN_NOTICE, LEAVE_NOTICE};
use crate::logic::{route_inbound, RejectReason};
use crate::state::{AppState, WRITE_TIMEOUT};

pub fn app(state: AppState, public_dir: PathBuf) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.max_message_size(state.config.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut socket_sender, mut socket_receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<String>(state.config.queue_capacity.max(1));
    let connection_id = Uuid::new_v4();
    let name = display_name(connection_id);

    let peers = state.hub.join(connection_id, tx).await;
    tracing::info!(conn = %connection_id, %name, peers, "WS connected");
    state.hub.announce_presence(JOIN_NOTICE).await;

    let ping_interval = state.config.ping_interval;
    let send_task = tokio::spawn(async move {
        let mut ping =
            tokio::time::interval_at(tokio::time::Instant::now() + ping_interval, ping_interval);
        loop {
            let outbound = tokio::select! {
                queued = rx.recv() => match queued {
                    Some(payload) => Message::Text(payload),
                    // Evicted or disconnected: the hub dropped our sender.
                    None => {
                        let _ = socket_sender.send(Message::Close(None)).await;
                        break;
                    }
                },
                _ = ping.tick() => Message::Ping(Vec::new()),
            };
            match tokio::time::timeout(WRITE_TIMEOUT, socket_sender.send(outbound)).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) | Err(_) => break,
            }
        }
    });

    let idle_timeout = state.config.idle_timeout;
    let max_bytes = state.config.max_message_bytes;
    loop {
        let message = match tokio::time::timeout(idle_timeout, socket_receiver.next()).await {
            Ok(Some(Ok(message))) => message,
            Ok(Some(Err(error))) => {
                tracing::debug!(conn = %connection_id, %error, "WS receive failed");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::info!(conn = %connection_id, "WS idle timeout");
                break;
            }
        };
        match message {
            Message::Text(text) => match route_inbound(&text, &name, max_bytes) {
                Ok(payload) => {
                    state.hub.broadcast(&payload, Some(connection_id)).await;
                }
                Err(RejectReason::Empty) => {}
                Err(reason) => {
                    tracing::warn!(conn = %connection_id, %reason, "dropping inbound frame");
                }
            },
            Message::Binary(data) => {
                tracing::debug!(conn = %connection_id, bytes = data.len(), "ignoring binary frame");
            }
            Message::Close(frame) => {
                if let Some(frame) = &frame {
                    tracing::debug!(
                        conn = %connection_id,
                        code = frame.code,
                        reason = %frame.reason,
                        "WS close frame"
                    );
                }
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    let peers = state.hub.leave(connection_id).await;
    send_task.abort();
    tracing::info!(conn = %connection_id, peers, "WS disconnected");
    state.hub.announce_presence(LEAVE_NOTICE).await;
}

#[cfg(test)]
#[path = "handlers_test.rs"]
mod tests;
