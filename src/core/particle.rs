//! Particle and viewport types
//!
//! - Point: logical (CSS pixel) coordinate
//! - Viewport: logical size plus capped device pixel ratio
//! - Particle: position, boot target, velocity, radius

use rand::Rng;
use std::f64::consts::TAU;

use super::config::FieldConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Drawing area in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Device pixel ratio after applying the cap
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Build a viewport, clamping negative/NaN sizes to zero and the pixel
    /// ratio to `(0, dpr_cap]` (falling back to 1.0 when unknown).
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64, dpr_cap: f64) -> Self {
        let dpr = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
            pixel_ratio: dpr.min(dpr_cap.max(f64::MIN_POSITIVE)),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Backing-store size in physical pixels
    pub fn physical_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio) as u32,
            (self.height * self.pixel_ratio) as u32,
        )
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Resting position, only consulted while booting
    pub target_x: f64,
    pub target_y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
}

impl Particle {
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move a fraction of the remaining distance toward the target.
    /// Returns true when the particle is within `threshold` on both axes.
    #[inline]
    pub fn ease_toward_target(&mut self, factor: f64, threshold: f64) -> bool {
        self.x += (self.target_x - self.x) * factor;
        self.y += (self.target_y - self.y) * factor;
        (self.target_x - self.x).abs() <= threshold && (self.target_y - self.y).abs() <= threshold
    }

    #[inline]
    pub fn snap_to_target(&mut self) {
        self.x = self.target_x;
        self.y = self.target_y;
    }

    /// Advance by velocity and bounce off the viewport edges.
    /// A crossed edge clamps the position and points the velocity back inside.
    pub fn advance(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;

        if self.x < 0.0 {
            self.x = 0.0;
            self.vx = self.vx.abs();
        }
        if self.x > width {
            self.x = width;
            self.vx = -self.vx.abs();
        }
        if self.y < 0.0 {
            self.y = 0.0;
            self.vy = self.vy.abs();
        }
        if self.y > height {
            self.y = height;
            self.vy = -self.vy.abs();
        }
    }

    /// Nudge velocity toward `pointer` if it lies inside `radius`.
    #[inline]
    pub fn steer_toward(&mut self, pointer: Point, radius: f64, influence: f64) {
        let dx = pointer.x - self.x;
        let dy = pointer.y - self.y;
        let dist = dx.hypot(dy);
        if dist > 0.0 && dist < radius {
            self.vx += dx / dist * influence;
            self.vy += dy / dist * influence;
        }
    }
}

/// Build a fresh particle set for `viewport`.
///
/// Targets are uniform in the viewport. With `start_centered` every particle
/// starts at the viewport centre (boot), otherwise it starts on its target.
pub fn create_particles<R: Rng + ?Sized>(
    rng: &mut R,
    config: &FieldConfig,
    viewport: &Viewport,
    start_centered: bool,
) -> Vec<Particle> {
    let count = config.particle_count(viewport.width);
    let center = viewport.center();

    (0..count)
        .map(|_| {
            let speed = config.speed.lerp(rng.gen::<f64>());
            let angle = rng.gen::<f64>() * TAU;
            let target_x = rng.gen::<f64>() * viewport.width;
            let target_y = rng.gen::<f64>() * viewport.height;
            let (x, y) = if start_centered {
                (center.x, center.y)
            } else {
                (target_x, target_y)
            };
            Particle {
                x,
                y,
                target_x,
                target_y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                radius: config.dot_radius.lerp(rng.gen::<f64>()),
            }
        })
        .collect()
}
