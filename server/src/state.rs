use std::sync::Arc;
use std::time::Duration;

use crate::error::ServerError;
use crate::hub::Hub;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 64 * 1024;
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(54);
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub queue_capacity: usize,
    pub max_message_bytes: usize,
    pub ping_interval: Duration,
    pub idle_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            ping_interval: DEFAULT_PING_INTERVAL,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl RelayConfig {
    /// Peers answer pings to stay alive, so a ping must go out before the
    /// idle timeout can fire.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.ping_interval >= self.idle_timeout {
            return Err(ServerError::Keepalive {
                ping: self.ping_interval,
                idle: self.idle_timeout,
            });
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Self {
        Self {
            hub: Arc::new(Hub::new()),
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
