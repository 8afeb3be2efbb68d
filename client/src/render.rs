use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use pizarra_shared::{Point, Viewport, BACKGROUND_COLOR};

use crate::session::Surface;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("Missing 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self { canvas, ctx })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Matches the bitmap to the parent element. Resizing wipes the bitmap,
    /// so the board starts over on a blank background.
    pub fn fit_to_parent(&mut self) {
        if let Some(parent) = self.canvas.parent_element() {
            let width = parent.client_width().max(1) as u32;
            let height = parent.client_height().max(1) as u32;
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
        self.fill_background();
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Viewport {
        Viewport::new(self.canvas.width() as f64, self.canvas.height() as f64)
    }

    fn draw_line(&mut self, from: Point, to: Point, color: &str, width: f64) {
        let ctx = &self.ctx;
        ctx.begin_path();
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(width);
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        ctx.stroke();
    }

    fn fill_background(&mut self) {
        self.ctx.set_fill_style_str(BACKGROUND_COLOR);
        self.ctx.fill_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }
}
