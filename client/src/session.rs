//! Client session: one per tab.
//!
//! Turns pointer input into locally drawn, normalized stroke segments, chat
//! input into outbound frames, and inbound frames into canvas or chat
//! updates. The browser is reached only through [`Surface`], [`Transport`]
//! and [`ChatPane`].

use pizarra_shared::{
    Point, StrokeSegment, Tool, Viewport, WireMessage, BASE_LINE_WIDTH, DEFAULT_COLOR,
};

pub const OWN_SENDER_LABEL: &str = "Tú";
pub const ANONYMOUS_SENDER: &str = "Usuario";
const LOG_SNIPPET_CHARS: usize = 200;

pub trait Surface {
    fn viewport(&self) -> Viewport;
    fn draw_line(&mut self, from: Point, to: Point, color: &str, width: f64);
    fn fill_background(&mut self);
}

pub trait Transport {
    fn is_open(&self) -> bool;
    fn send_text(&self, payload: &str);
}

pub trait ChatPane {
    fn add_message(&mut self, sender: &str, content: &str, own: bool);
    fn add_system_message(&mut self, text: &str);
    fn set_online_users(&mut self, label: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionEvent {
    Open,
    Close,
    Error,
}

impl ConnectionEvent {
    pub fn notice(self) -> &'static str {
        match self {
            ConnectionEvent::Open => "Conectado al servidor",
            ConnectionEvent::Close => "Desconectado del servidor",
            ConnectionEvent::Error => "Error de conexión",
        }
    }
}

pub fn online_users_label(count: u32) -> String {
    format!("{count} usuarios en línea")
}

pub struct Session<S, T, C> {
    surface: S,
    transport: T,
    chat: C,
    drawing: bool,
    last: Point,
    color: String,
    tool: Tool,
    line_width: f64,
}

impl<S: Surface, T: Transport, C: ChatPane> Session<S, T, C> {
    pub fn new(surface: S, transport: T, chat: C) -> Self {
        Self {
            surface,
            transport,
            chat,
            drawing: false,
            last: Point::new(0.0, 0.0),
            color: DEFAULT_COLOR.to_string(),
            tool: Tool::Brush,
            line_width: BASE_LINE_WIDTH,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn chat(&self) -> &C {
        &self.chat
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_color(&mut self, color: &str) {
        if !color.is_empty() {
            self.color = color.to_string();
        }
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.drawing = true;
        self.last = point;
    }

    /// Draws from the last pointer position to `point` and relays the
    /// segment. Ignored outside a gesture. Only the part of the segment on
    /// the canvas is drawn and sent, so peers render the same line.
    pub fn pointer_move(&mut self, point: Point) {
        if !self.drawing {
            return;
        }
        let viewport = self.surface.viewport();
        let clipped = viewport.clip_segment(self.last, point);
        self.last = point;
        let Some((from, to)) = clipped else {
            return;
        };
        let (color, width) = self.tool.stroke_style(&self.color, self.line_width);
        let color = color.to_string();
        self.surface.draw_line(from, to, &color, width);
        if let Some(segment) = StrokeSegment::from_pixels(&viewport, from, to, &color, width) {
            self.emit(&WireMessage::Stroke(segment));
        }
    }

    pub fn pointer_up(&mut self) {
        self.drawing = false;
    }

    pub fn handle_socket_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Open => log::info!("connected to relay"),
            ConnectionEvent::Close => log::info!("disconnected from relay"),
            ConnectionEvent::Error => log::error!("relay connection error"),
        }
        self.chat.add_system_message(event.notice());
    }

    pub fn handle_socket_message(&mut self, raw: &str) {
        let message = match WireMessage::from_json(raw) {
            Ok(message) => message,
            Err(error) => {
                let snippet: String = raw.chars().take(LOG_SNIPPET_CHARS).collect();
                log::error!("failed to process message: {error} payload={snippet:?}");
                return;
            }
        };
        match message {
            WireMessage::Chat { sender, message } => {
                let sender = sender.as_deref().unwrap_or(ANONYMOUS_SENDER);
                self.chat.add_message(sender, &message, false);
            }
            WireMessage::System {
                message,
                online_users,
            } => {
                self.chat.add_system_message(&message);
                self.chat
                    .set_online_users(&online_users_label(online_users.unwrap_or(1)));
            }
            WireMessage::Stroke(segment) => {
                let viewport = self.surface.viewport();
                let (from, to) = segment.to_pixels(&viewport);
                self.surface
                    .draw_line(from, to, &segment.color, segment.line_width);
            }
            WireMessage::Clear => self.surface.fill_background(),
        }
    }

    /// Returns whether the message went out, so the caller knows to reset
    /// its input field.
    pub fn send_chat(&mut self, text: &str) -> bool {
        let message = text.trim();
        if message.is_empty() || !self.transport.is_open() {
            return false;
        }
        self.emit(&WireMessage::Chat {
            sender: None,
            message: message.to_string(),
        });
        self.chat.add_message(OWN_SENDER_LABEL, message, true);
        true
    }

    /// `confirmed` is the answer to the confirmation prompt, asked before
    /// the session is borrowed.
    pub fn clear_canvas(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        self.surface.fill_background();
        self.emit(&WireMessage::Clear);
        true
    }

    fn emit(&self, message: &WireMessage) {
        if !self.transport.is_open() {
            return;
        }
        match message.to_json() {
            Ok(payload) => self.transport.send_text(&payload),
            Err(error) => log::error!("failed to encode {} message: {error}", message.kind()),
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
