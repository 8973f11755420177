//! Drawing surface abstraction
//!
//! The renderer only needs four primitives. The browser implements them on a
//! Canvas 2D context; `RecordingSurface` keeps the commands in memory for the
//! CLI and tests.

use super::particle::{Point, Viewport};

/// Straight (non-premultiplied) colour, channels 0-255 plus alpha 0.0-1.0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgba()` notation
    pub fn to_css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

pub trait Surface {
    /// Size the backing store for `viewport` and scale so that drawing
    /// coordinates are logical pixels.
    fn configure(&mut self, viewport: &Viewport);

    fn clear(&mut self, width: f64, height: f64);

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f64);

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba);
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Configure { physical: (u32, u32), scale: f64 },
    Clear { width: f64, height: f64 },
    Line { from: Point, to: Point, color: Rgba, width: f64 },
    Circle { center: Point, radius: f64, color: Rgba },
}

/// In-memory surface that records every draw call.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of frames drawn (each frame starts with a clear)
    pub fn frames(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Clear { .. }))
            .count()
    }

    /// Commands of the most recent frame, starting at its clear
    pub fn last_frame(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Clear { .. }))
            .unwrap_or(self.commands.len());
        &self.commands[start..]
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }
}

impl Surface for RecordingSurface {
    fn configure(&mut self, viewport: &Viewport) {
        self.commands.push(DrawCommand::Configure {
            physical: viewport.physical_size(),
            scale: viewport.pixel_ratio,
        });
    }

    fn clear(&mut self, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Rgba, width: f64) {
        self.commands.push(DrawCommand::Line { from, to, color, width });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::Circle { center, radius, color });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_notation() {
        assert_eq!(Rgba::new(99, 102, 241, 0.8).to_css(), "rgba(99, 102, 241, 0.8)");
        assert_eq!(Rgba::new(1, 2, 3, 1.0).with_alpha(0.5).to_css(), "rgba(1, 2, 3, 0.5)");
    }

    #[test]
    fn recording_tracks_frames() {
        let mut surface = RecordingSurface::new();
        assert_eq!(surface.frames(), 0);
        assert!(surface.last_frame().is_empty());

        surface.clear(10.0, 10.0);
        surface.fill_circle(Point::new(1.0, 1.0), 2.0, Rgba::new(0, 0, 0, 1.0));
        surface.clear(10.0, 10.0);
        surface.stroke_line(Point::default(), Point::new(1.0, 1.0), Rgba::new(0, 0, 0, 1.0), 1.0);

        assert_eq!(surface.frames(), 2);
        assert_eq!(surface.last_frame().len(), 2);
    }
}
