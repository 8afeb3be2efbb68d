use pizarra_shared::{ProtocolError, WireMessage};

#[derive(Debug, thiserror::Error)]
pub enum RejectReason {
    #[error("empty frame")]
    Empty,
    #[error("frame of {0} bytes exceeds the size limit")]
    TooLarge(usize),
    #[error("malformed frame: {0}")]
    Malformed(#[from] ProtocolError),
    #[error("system notices are server-only")]
    ServerOnly,
}

/// Decides what to relay for a text frame received from `sender_name`.
///
/// Strokes and clear commands go out byte-for-byte. Chat messages without a
/// sender are stamped with the connection's display name.
pub fn route_inbound(
    raw: &str,
    sender_name: &str,
    max_bytes: usize,
) -> Result<String, RejectReason> {
    if raw.trim().is_empty() {
        return Err(RejectReason::Empty);
    }
    if raw.len() > max_bytes {
        return Err(RejectReason::TooLarge(raw.len()));
    }
    match WireMessage::from_json(raw)? {
        WireMessage::System { .. } => Err(RejectReason::ServerOnly),
        WireMessage::Chat {
            sender: None,
            message,
        } => Ok(WireMessage::Chat {
            sender: Some(sender_name.to_string()),
            message,
        }
        .to_json()?),
        WireMessage::Chat { .. } | WireMessage::Stroke(_) | WireMessage::Clear => {
            Ok(raw.to_string())
        }
    }
}

#[cfg(test)]
#[path = "logic_test.rs"]
mod tests;
