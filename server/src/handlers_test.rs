use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::*;
use crate::state::RelayConfig;

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn spawn_relay() -> SocketAddr {
    spawn_relay_with(RelayConfig::default()).await
}

async fn spawn_relay_with(config: RelayConfig) -> SocketAddr {
    let public_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../static");
    let app = app(AppState::new(config), public_dir);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let message = timeout(Duration::from_secs(2), client.next())
            .await
            .expect("relay frame timed out")
            .expect("socket closed")
            .expect("socket error");
        if let WsMessage::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

async fn assert_silent(client: &mut Client) {
    let result = timeout(Duration::from_millis(150), client.next()).await;
    assert!(result.is_err(), "expected no frame, got {result:?}");
}

async fn send(client: &mut Client, raw: &str) {
    client.send(WsMessage::text(raw.to_string())).await.unwrap();
}

/// Connects two clients and drains the presence notices of both joins.
async fn pair(addr: SocketAddr) -> (Client, Client) {
    let mut a = connect(addr).await;
    assert_eq!(next_json(&mut a).await["onlineUsers"], json!(1));
    let mut b = connect(addr).await;
    assert_eq!(next_json(&mut a).await["onlineUsers"], json!(2));
    assert_eq!(next_json(&mut b).await["onlineUsers"], json!(2));
    (a, b)
}

#[tokio::test]
async fn join_announces_presence_to_everyone() {
    let addr = spawn_relay().await;
    let mut a = connect(addr).await;
    assert_eq!(
        next_json(&mut a).await,
        json!({"type": "system", "message": JOIN_NOTICE, "onlineUsers": 1})
    );
}

#[tokio::test]
async fn stroke_reaches_peers_but_not_sender() {
    let addr = spawn_relay().await;
    let (mut a, mut b) = pair(addr).await;

    let stroke = r##"{"x0":0.0125,"y0":0.02,"x1":0.0625,"y1":0.1,"color":"#e74c3c","lineWidth":3}"##;
    send(&mut a, stroke).await;

    assert_eq!(
        next_json(&mut b).await,
        serde_json::from_str::<Value>(stroke).unwrap()
    );
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn chat_is_relayed_with_sender_name() {
    let addr = spawn_relay().await;
    let (mut a, mut b) = pair(addr).await;

    send(&mut a, r#"{"type":"chat","message":"hola"}"#).await;

    let frame = next_json(&mut b).await;
    assert_eq!(frame["type"], json!("chat"));
    assert_eq!(frame["message"], json!("hola"));
    assert!(frame["sender"].as_str().unwrap().starts_with("Usuario-"));
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn invalid_frames_are_not_relayed() {
    let addr = spawn_relay().await;
    let (mut a, mut b) = pair(addr).await;

    send(&mut a, "not json").await;
    send(&mut a, r#"{"type":"system","message":"fake","onlineUsers":42}"#).await;
    send(&mut a, "").await;
    assert_silent(&mut b).await;

    send(&mut a, r#"{"type":"clear"}"#).await;
    assert_eq!(next_json(&mut b).await, json!({"type": "clear"}));
}

#[tokio::test]
async fn leaving_updates_online_count() {
    let addr = spawn_relay().await;
    let (mut a, mut b) = pair(addr).await;

    b.close(None).await.unwrap();

    assert_eq!(
        next_json(&mut a).await,
        json!({"type": "system", "message": LEAVE_NOTICE, "onlineUsers": 1})
    );
}

fn fast_keepalive(idle_timeout: Duration) -> RelayConfig {
    RelayConfig {
        ping_interval: Duration::from_millis(100),
        idle_timeout,
        ..RelayConfig::default()
    }
}

#[tokio::test]
async fn silent_client_is_pinged() {
    let addr = spawn_relay_with(fast_keepalive(Duration::from_secs(5))).await;
    let mut a = connect(addr).await;

    let pinged = timeout(Duration::from_secs(1), async {
        while let Some(Ok(message)) = a.next().await {
            if matches!(message, WsMessage::Ping(_)) {
                return true;
            }
        }
        false
    })
    .await;
    assert!(matches!(pinged, Ok(true)), "no ping within a second");
}

#[tokio::test]
async fn unresponsive_client_is_dropped_after_idle_timeout() {
    let addr = spawn_relay_with(fast_keepalive(Duration::from_millis(500))).await;
    let (mut a, _b) = pair(addr).await;

    // `a` keeps reading and so answers pings; `_b` never reads again.
    assert_eq!(
        next_json(&mut a).await,
        json!({"type": "system", "message": LEAVE_NOTICE, "onlineUsers": 1})
    );
}

#[tokio::test]
async fn oversized_frame_closes_the_sender() {
    let addr = spawn_relay_with(RelayConfig {
        max_message_bytes: 1024,
        ..RelayConfig::default()
    })
    .await;
    let (mut a, mut b) = pair(addr).await;

    let chat = json!({"type": "chat", "message": "x".repeat(4096)}).to_string();
    let _ = a.send(WsMessage::text(chat)).await;

    assert_eq!(
        next_json(&mut b).await,
        json!({"type": "system", "message": LEAVE_NOTICE, "onlineUsers": 1})
    );
}

#[tokio::test]
async fn health_reports_ok() {
    let addr = spawn_relay().await;
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.ends_with("OK"), "{response}");
}
