//! Particle field renderer
//!
//! Owns the whole simulation: particle set, pointer, boot state and frame
//! limiter. Hosts feed it viewport changes, input and display callbacks; it
//! draws onto whatever `Surface` is mounted.
//!
//! ```text
//! Unmounted --mount--> Animating(Booting) --boot ends--> Animating(Steady)
//!                  \-> Static (reduced motion, one frame per resize)
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, trace};

use super::config::FieldConfig;
use super::grid::SpatialGrid;
use super::pacing::{FrameLimiter, Visibility};
use super::particle::{create_particles, Particle, Point, Viewport};
use super::surface::Surface;
use crate::theme::{colors, LINK_WIDTH, POINTER_LINK_WIDTH};

/// Sub-state of the animated mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Converging from the centre; `started_at` is set by the first accepted tick
    Booting { started_at: Option<f64> },
    Steady,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    /// Reduced motion: one static frame per resize, ticks ignored
    Static,
    Animating(Phase),
}

/// What a tick produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Throttled, unmounted or static; no state changed
    Skipped,
    Rendered(FrameStats),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub links: usize,
    pub pointer_links: usize,
    pub dots: usize,
    pub booting: bool,
}

pub struct ParticleField<S: Surface> {
    config: FieldConfig,
    rng: StdRng,
    surface: Option<S>,
    viewport: Viewport,
    particles: Vec<Particle>,
    pointer: Option<Point>,
    mode: Mode,
    /// Set once the boot animation has completed; never cleared
    has_booted: bool,
    limiter: FrameLimiter,
}

impl<S: Surface> ParticleField<S> {
    pub fn new(config: FieldConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic field, used by tests and the CLI
    pub fn with_seed(config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, rng: StdRng) -> Self {
        let limiter = FrameLimiter::new(config.target_fps, config.hidden_fps);
        Self {
            viewport: Viewport::new(0.0, 0.0, 1.0, config.dpr_cap),
            config,
            rng,
            surface: None,
            particles: Vec::new(),
            pointer: None,
            mode: Mode::Animating(Phase::Steady),
            has_booted: false,
            limiter,
        }
    }

    /// Attach a drawing surface and start from a fresh particle set.
    pub fn mount(&mut self, surface: S, width: f64, height: f64, device_pixel_ratio: f64) {
        self.surface = Some(surface);
        self.limiter.reset();
        self.resize(width, height, device_pixel_ratio);
    }

    /// Detach and return the surface. The host must cancel any pending frame
    /// callback before dropping it.
    pub fn unmount(&mut self) -> Option<S> {
        self.particles.clear();
        self.pointer = None;
        self.limiter.reset();
        self.surface.take()
    }

    /// Build the particle set for a `width` x `height` viewport.
    ///
    /// `start_centered` places every particle at the centre and arms the boot
    /// animation; otherwise particles start at rest on their targets.
    pub fn initialize(&mut self, width: f64, height: f64, start_centered: bool) {
        if self.surface.is_none() {
            return;
        }
        self.viewport = Viewport::new(width, height, self.viewport.pixel_ratio, self.config.dpr_cap);

        let start_centered = start_centered && self.mode != Mode::Static;
        self.particles = create_particles(&mut self.rng, &self.config, &self.viewport, start_centered);
        if let Mode::Animating(_) = self.mode {
            self.mode = Mode::Animating(if start_centered {
                Phase::Booting { started_at: None }
            } else {
                Phase::Steady
            });
        }

        debug!(
            width = self.viewport.width,
            height = self.viewport.height,
            count = self.particles.len(),
            start_centered,
            "Particle set initialized"
        );
    }

    /// Resize the surface and rebuild the particle set.
    ///
    /// Boot only replays if it never completed. In static mode this renders
    /// exactly one new frame.
    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.viewport = Viewport::new(width, height, device_pixel_ratio, self.config.dpr_cap);
        surface.configure(&self.viewport);

        match self.mode {
            Mode::Static => self.render_static(),
            Mode::Animating(_) => {
                let start_centered = !self.has_booted;
                self.initialize(width, height, start_centered);
            }
        }
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        if self.surface.is_some() {
            self.pointer = Some(Point::new(x, y));
        }
    }

    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    pub fn set_visibility(&mut self, visibility: Visibility) {
        self.limiter.set_visibility(visibility);
    }

    /// Switch between the static frame and the animated loop.
    ///
    /// Enabling draws one static frame and stops ticking; the host must cancel
    /// its pending frame callback. Disabling restarts from a fresh particle set
    /// (booting if boot never completed); the host must schedule frames again.
    pub fn set_reduced_motion(&mut self, reduced: bool) {
        match (reduced, self.mode) {
            (true, Mode::Static) | (false, Mode::Animating(_)) => return,
            (true, Mode::Animating(_)) => {
                info!("Reduced motion enabled, rendering static frame");
                self.mode = Mode::Static;
                self.limiter.reset();
                self.render_static();
            }
            (false, Mode::Static) => {
                info!(has_booted = self.has_booted, "Reduced motion disabled, resuming animation");
                self.mode = Mode::Animating(Phase::Steady);
                self.limiter.reset();
                let (width, height) = (self.viewport.width, self.viewport.height);
                self.initialize(width, height, !self.has_booted);
            }
        }
    }

    /// Advance one frame at display timestamp `now` (ms) and draw it.
    pub fn tick(&mut self, now: f64) -> FrameOutcome {
        if self.surface.is_none() {
            return FrameOutcome::Skipped;
        }
        let Mode::Animating(phase) = self.mode else {
            return FrameOutcome::Skipped;
        };
        if !self.limiter.accept(now) {
            return FrameOutcome::Skipped;
        }

        let mut boot_progress = 1.0;
        let booting = match phase {
            Phase::Booting { started_at } => {
                let started_at = started_at.unwrap_or(now);
                boot_progress = self.boot_progress(now - started_at);
                self.mode = Mode::Animating(Phase::Booting { started_at: Some(started_at) });
                let converged = self.step_boot();

                if boot_progress >= 1.0 || converged {
                    self.finish_boot(now - started_at);
                    boot_progress = 1.0;
                    false
                } else {
                    true
                }
            }
            Phase::Steady => {
                self.step_steady();
                false
            }
        };

        let (link_opacity, radius_scale) = if booting {
            let start = self.config.boot_radius_scale_start;
            (boot_progress, start + (1.0 - start) * boot_progress)
        } else {
            (1.0, 1.0)
        };

        let stats = self.draw_frame(link_opacity, radius_scale, !booting);
        trace!(now, ?stats, "Frame rendered");
        FrameOutcome::Rendered(stats)
    }

    fn boot_progress(&self, elapsed: f64) -> f64 {
        if self.config.boot_duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed / self.config.boot_duration_ms).clamp(0.0, 1.0)
    }

    /// Ease every particle toward its target; true when all have arrived
    fn step_boot(&mut self) -> bool {
        let factor = self.config.boot_lerp_factor;
        let threshold = self.config.boot_snap_threshold;
        let mut all_near = true;
        for p in self.particles.iter_mut() {
            if !p.ease_toward_target(factor, threshold) {
                all_near = false;
            }
        }
        all_near
    }

    fn finish_boot(&mut self, elapsed: f64) {
        for p in self.particles.iter_mut() {
            p.snap_to_target();
        }
        self.mode = Mode::Animating(Phase::Steady);
        self.has_booted = true;
        info!(elapsed_ms = elapsed, count = self.particles.len(), "Boot animation complete");
    }

    fn step_steady(&mut self) {
        let FieldConfig {
            direction_wiggle,
            pointer_attraction_radius,
            pointer_influence,
            ..
        } = self.config;
        let (width, height) = (self.viewport.width, self.viewport.height);

        for p in self.particles.iter_mut() {
            p.vx += (self.rng.gen::<f64>() - 0.5) * direction_wiggle;
            p.vy += (self.rng.gen::<f64>() - 0.5) * direction_wiggle;
            p.advance(width, height);
            if let Some(pointer) = self.pointer {
                p.steer_toward(pointer, pointer_attraction_radius, pointer_influence);
            }
        }
    }

    /// Replace the particle set with one at rest and draw it once.
    fn render_static(&mut self) {
        if self.surface.is_none() {
            return;
        }
        self.particles = create_particles(&mut self.rng, &self.config, &self.viewport, false);
        let stats = self.draw_frame(self.config.static_link_opacity, 1.0, false);
        debug!(?stats, "Static frame rendered");
    }

    fn draw_frame(&mut self, link_opacity: f64, radius_scale: f64, pointer_links: bool) -> FrameStats {
        let mut stats = FrameStats {
            booting: matches!(self.mode, Mode::Animating(Phase::Booting { .. })),
            ..FrameStats::default()
        };
        let Some(surface) = self.surface.as_mut() else {
            return stats;
        };
        let config = &self.config;
        let particles = &self.particles;

        surface.clear(self.viewport.width, self.viewport.height);

        let grid = SpatialGrid::build(particles, config.max_link_distance);
        for link in grid.links(particles, config.max_link_distance, config.max_line_opacity, link_opacity) {
            surface.stroke_line(
                particles[link.a].position(),
                particles[link.b].position(),
                colors::LINK.with_alpha(link.opacity),
                LINK_WIDTH,
            );
            stats.links += 1;
        }

        if let (true, Some(pointer)) = (pointer_links, self.pointer) {
            let max = config.pointer_link_distance;
            for p in particles {
                let dist = (pointer.x - p.x).hypot(pointer.y - p.y);
                if dist < max {
                    let alpha = config.pointer_line_opacity_max * (1.0 - dist / max);
                    surface.stroke_line(pointer, p.position(), colors::LINK.with_alpha(alpha), POINTER_LINK_WIDTH);
                    stats.pointer_links += 1;
                }
            }
        }

        for p in particles {
            surface.fill_circle(p.position(), p.radius * radius_scale, colors::DOT);
            stats.dots += 1;
        }
        stats
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn visibility(&self) -> Visibility {
        self.limiter.visibility()
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// True while the host should keep scheduling frame callbacks
    pub fn is_animating(&self) -> bool {
        self.is_mounted() && matches!(self.mode, Mode::Animating(_))
    }

    pub fn is_booting(&self) -> bool {
        matches!(self.mode, Mode::Animating(Phase::Booting { .. }))
    }

    pub fn has_booted(&self) -> bool {
        self.has_booted
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }
}
