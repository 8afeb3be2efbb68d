mod protocol;

pub use protocol::{ProtocolError, StrokeSegment, WireMessage};

pub const DEFAULT_COLOR: &str = "#e74c3c";
pub const REMOTE_FALLBACK_COLOR: &str = "#333";
pub const BACKGROUND_COLOR: &str = "white";
pub const BASE_LINE_WIDTH: f64 = 3.0;
pub const ERASER_WIDTH_MULTIPLIER: f64 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn clamp(self) -> Self {
        Self {
            x: clamp_unit(self.x),
            y: clamp_unit(self.y),
        }
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.max(0.0).min(1.0)
}

/// Pixel dimensions of a canvas. Converts between canvas pixels and the
/// unit square that strokes travel in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Divides by this canvas's size. Points outside the canvas are clamped
    /// onto its edge.
    pub fn normalize(&self, point: Point) -> Option<Point> {
        if !self.is_drawable() || !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        Some(Point::new(point.x / self.width, point.y / self.height).clamp())
    }

    pub fn denormalize(&self, point: Point) -> Point {
        Point::new(point.x * self.width, point.y * self.height)
    }

    /// Cuts the pixel segment `from -> to` down to the part inside the
    /// canvas, keeping its slope (Liang-Barsky). `None` when no part of it
    /// lies on the canvas.
    pub fn clip_segment(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        if !self.is_drawable() {
            return None;
        }
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let mut enter = 0.0_f64;
        let mut exit = 1.0_f64;
        let edges = [
            (-dx, from.x),
            (dx, self.width - from.x),
            (-dy, from.y),
            (dy, self.height - from.y),
        ];
        for (p, q) in edges {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let t = q / p;
            if p < 0.0 {
                enter = enter.max(t);
            } else {
                exit = exit.min(t);
            }
            if enter > exit {
                return None;
            }
        }
        let at = |t: f64| Point::new(from.x + t * dx, from.y + t * dy);
        Some((at(enter), at(exit)))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Brush,
    Eraser,
}

impl Tool {
    /// Parses the `data-tool` attribute of a tool button.
    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "brush" => Some(Tool::Brush),
            "eraser" => Some(Tool::Eraser),
            _ => None,
        }
    }

    /// Colour and width a segment is painted with when this tool is active.
    pub fn stroke_style<'a>(self, color: &'a str, line_width: f64) -> (&'a str, f64) {
        match self {
            Tool::Brush => (color, line_width),
            Tool::Eraser => (BACKGROUND_COLOR, line_width * ERASER_WIDTH_MULTIPLIER),
        }
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
