//! Canvas 2D drawing surface

use std::f64::consts::TAU;

use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::core::{Point, Rgba, Surface, Viewport};

/// Surface backed by an `HtmlCanvasElement` and its 2D context.
///
/// Canvas calls that return `Result` are fire-and-forget: a failed call only
/// loses part of one frame.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }
}

impl Surface for CanvasSurface {
    fn configure(&mut self, viewport: &Viewport) {
        let (w, h) = viewport.physical_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);

        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", viewport.width));
        let _ = style.set_property("height", &format!("{}px", viewport.height));

        let _ = self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        let _ = self.ctx.scale(viewport.pixel_ratio, viewport.pixel_ratio);
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
        // Default compositing, no blur: blending is the expensive part
        let _ = self.ctx.set_global_composite_operation("source-over");
        self.ctx.set_shadow_blur(0.0);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.begin_path();
        let _ = self.ctx.arc(center.x, center.y, radius.max(0.0), 0.0, TAU);
        self.ctx.fill();
    }
}
