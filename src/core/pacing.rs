//! Frame pacing
//!
//! Display callbacks arrive at the monitor refresh rate; the limiter accepts
//! only those spaced at least `1000 / fps` ms after the last accepted one.

/// Host page visibility
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

#[derive(Clone, Debug)]
pub struct FrameLimiter {
    visible_fps: f64,
    hidden_fps: f64,
    visibility: Visibility,
    /// Timestamp (ms) of the last accepted frame
    last_frame: Option<f64>,
}

impl FrameLimiter {
    pub fn new(visible_fps: f64, hidden_fps: f64) -> Self {
        Self {
            visible_fps,
            hidden_fps,
            visibility: Visibility::Visible,
            last_frame: None,
        }
    }

    pub fn target_fps(&self) -> f64 {
        match self.visibility {
            Visibility::Visible => self.visible_fps,
            Visibility::Hidden => self.hidden_fps,
        }
    }

    /// Minimum spacing between accepted frames in ms
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.target_fps()
    }

    /// Switch the frame-rate target. Becoming visible forgets the last frame
    /// so the first foreground callback renders immediately.
    pub fn set_visibility(&mut self, visibility: Visibility) {
        if visibility == Visibility::Visible && self.visibility != Visibility::Visible {
            self.last_frame = None;
        }
        self.visibility = visibility;
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns true (and records `now`) if a frame should render at `now`.
    pub fn accept(&mut self, now: f64) -> bool {
        if let Some(last) = self.last_frame {
            if now - last < self.frame_interval() {
                return false;
            }
        }
        self.last_frame = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}
