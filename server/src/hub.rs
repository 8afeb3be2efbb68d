//! Registry of connected sockets and fan-out of relayed frames.
//!
//! Each peer owns a bounded outbound queue. Broadcasting never waits: a peer
//! whose queue is full (or whose writer has gone away) is evicted, which
//! drops its sender and lets its writer task close the socket.

use std::collections::HashMap;

use pizarra_shared::WireMessage;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

pub const JOIN_NOTICE: &str = "Un usuario se ha unido";
pub const LEAVE_NOTICE: &str = "Un usuario se ha ido";

pub fn display_name(id: Uuid) -> String {
    let simple = id.simple().to_string();
    format!("Usuario-{}", &simple[..4])
}

#[derive(Default)]
pub struct Hub {
    peers: RwLock<HashMap<Uuid, mpsc::Sender<String>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn join(&self, id: Uuid, sender: mpsc::Sender<String>) -> usize {
        let mut peers = self.peers.write().await;
        peers.insert(id, sender);
        peers.len()
    }

    /// Returns the number of peers left. Leaving twice is harmless.
    pub async fn leave(&self, id: Uuid) -> usize {
        let mut peers = self.peers.write().await;
        peers.remove(&id);
        peers.len()
    }

    pub async fn len(&self) -> usize {
        self.peers.read().await.len()
    }

    /// Queues `payload` for every peer except `except`. Returns how many
    /// peers accepted it.
    pub async fn broadcast(&self, payload: &str, except: Option<Uuid>) -> usize {
        let mut delivered = 0;
        let mut evicted = Vec::new();
        {
            let peers = self.peers.read().await;
            for (id, sender) in peers.iter() {
                if Some(*id) == except {
                    continue;
                }
                match sender.try_send(payload.to_string()) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!(conn = %id, "outbound queue full, evicting peer");
                        evicted.push(*id);
                    }
                    Err(TrySendError::Closed(_)) => evicted.push(*id),
                }
            }
        }
        if !evicted.is_empty() {
            let mut peers = self.peers.write().await;
            for id in evicted {
                peers.remove(&id);
            }
        }
        delivered
    }

    /// Tells everyone, including the peer that just joined, how many users
    /// are online.
    pub async fn announce_presence(&self, notice: &str) {
        let online = self.len().await;
        let message = WireMessage::System {
            message: notice.to_string(),
            online_users: Some(u32::try_from(online).unwrap_or(u32::MAX)),
        };
        match message.to_json() {
            Ok(payload) => {
                self.broadcast(&payload, None).await;
            }
            Err(error) => tracing::error!(%error, "failed to encode presence notice"),
        }
    }
}

#[cfg(test)]
#[path = "hub_test.rs"]
mod tests;
