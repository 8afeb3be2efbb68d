//! JSON envelopes exchanged over `/ws`.
//!
//! Every frame is a flat JSON object. Chat, system and clear frames carry a
//! `type` discriminator; a frame without one is a stroke segment.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Point, Viewport, BASE_LINE_WIDTH, REMOTE_FALLBACK_COLOR};

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown message type: {0}")]
    UnknownType(String),
}

/// One line between two points, in normalized [0,1] coordinates.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StrokeSegment {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    #[serde(default = "default_color", deserialize_with = "color_or_default")]
    pub color: String,
    #[serde(
        rename = "lineWidth",
        default = "default_line_width",
        deserialize_with = "line_width_or_default"
    )]
    pub line_width: f64,
}

fn default_color() -> String {
    REMOTE_FALLBACK_COLOR.to_string()
}

fn default_line_width() -> f64 {
    BASE_LINE_WIDTH
}

// `null` and `""` fall back like a missing colour.
fn color_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|color| !color.is_empty())
        .unwrap_or_else(default_color))
}

// `null` and `0` fall back like a missing width.
fn line_width_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .filter(|width| *width != 0.0)
        .unwrap_or_else(default_line_width))
}

impl StrokeSegment {
    /// Builds a segment from canvas pixel positions, normalized by the
    /// sending canvas. `None` when the canvas has no area.
    pub fn from_pixels(
        viewport: &Viewport,
        from: Point,
        to: Point,
        color: &str,
        line_width: f64,
    ) -> Option<Self> {
        let from = viewport.normalize(from)?;
        let to = viewport.normalize(to)?;
        Some(Self {
            x0: from.x,
            y0: from.y,
            x1: to.x,
            y1: to.y,
            color: color.to_string(),
            line_width,
        })
    }

    /// Endpoints scaled to the receiving canvas.
    pub fn to_pixels(&self, viewport: &Viewport) -> (Point, Point) {
        (
            viewport.denormalize(Point::new(self.x0, self.y0)),
            viewport.denormalize(Point::new(self.x1, self.y1)),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WireMessage {
    Stroke(StrokeSegment),
    Chat {
        sender: Option<String>,
        message: String,
    },
    System {
        message: String,
        online_users: Option<u32>,
    },
    Clear,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum Envelope {
    #[serde(rename = "chat")]
    Chat {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender: Option<String>,
        message: String,
    },
    #[serde(rename = "system")]
    System {
        message: String,
        #[serde(
            rename = "onlineUsers",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        online_users: Option<u32>,
    },
    #[serde(rename = "clear")]
    Clear,
}

impl WireMessage {
    pub fn from_json(raw: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(raw)?;
        let kind = match value.get("type") {
            None => return Ok(WireMessage::Stroke(serde_json::from_value(value)?)),
            Some(Value::String(kind)) => kind.as_str(),
            Some(other) => return Err(ProtocolError::UnknownType(other.to_string())),
        };
        if !matches!(kind, "chat" | "system" | "clear") {
            return Err(ProtocolError::UnknownType(kind.to_string()));
        }
        let message = match serde_json::from_value::<Envelope>(value)? {
            Envelope::Chat { sender, message } => WireMessage::Chat { sender, message },
            Envelope::System {
                message,
                online_users,
            } => WireMessage::System {
                message,
                online_users,
            },
            Envelope::Clear => WireMessage::Clear,
        };
        Ok(message)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        let payload = match self {
            WireMessage::Stroke(segment) => serde_json::to_string(segment)?,
            WireMessage::Chat { sender, message } => serde_json::to_string(&Envelope::Chat {
                sender: sender.clone(),
                message: message.clone(),
            })?,
            WireMessage::System {
                message,
                online_users,
            } => serde_json::to_string(&Envelope::System {
                message: message.clone(),
                online_users: *online_users,
            })?,
            WireMessage::Clear => serde_json::to_string(&Envelope::Clear)?,
        };
        Ok(payload)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WireMessage::Stroke(_) => "stroke",
            WireMessage::Chat { .. } => "chat",
            WireMessage::System { .. } => "system",
            WireMessage::Clear => "clear",
        }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
