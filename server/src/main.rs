use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod error;
mod handlers;
mod hub;
mod logic;
mod state;

use crate::error::ServerError;
use crate::handlers::app;
use crate::state::{
    AppState, RelayConfig, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_MESSAGE_BYTES, DEFAULT_PING_INTERVAL,
    DEFAULT_QUEUE_CAPACITY,
};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
    #[arg(long, env = "PIZARRA_PUBLIC_DIR")]
    public_dir: Option<PathBuf>,
    #[arg(long, env = "PIZARRA_QUEUE_CAPACITY", default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,
    #[arg(long, env = "PIZARRA_MAX_MESSAGE_BYTES", default_value_t = DEFAULT_MAX_MESSAGE_BYTES)]
    max_message_bytes: usize,
    #[arg(long, env = "PIZARRA_PING_INTERVAL_SECS", default_value_t = DEFAULT_PING_INTERVAL.as_secs())]
    ping_interval_secs: u64,
    #[arg(long, env = "PIZARRA_IDLE_TIMEOUT_SECS", default_value_t = DEFAULT_IDLE_TIMEOUT.as_secs())]
    idle_timeout_secs: u64,
}

impl Args {
    fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            queue_capacity: self.queue_capacity.max(1),
            max_message_bytes: self.max_message_bytes,
            ping_interval: Duration::from_secs(self.ping_interval_secs.max(1)),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs.max(1)),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = args.relay_config();
    config.validate()?;
    let public_dir = args
        .public_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../static"));
    tracing::info!(public_dir = %public_dir.display(), ?config, "starting relay");

    let app = app(AppState::new(config), public_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    tracing::info!(port = args.port, "whiteboard running at http://localhost:{}", args.port);
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
