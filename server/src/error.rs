use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("ping interval {ping:?} must be shorter than idle timeout {idle:?}")]
    Keepalive { ping: Duration, idle: Duration },
    #[error("server crashed: {0}")]
    Serve(#[source] std::io::Error),
}
