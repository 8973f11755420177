//! Tunables for the particle field
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! configuration. Hosts load overrides from their own source: the browser reads
//! `window.__particle_field_config`, the CLI reads `PARTICLE_FIELD_CONFIG`.

use serde::Deserialize;

/// Inclusive-exclusive range used for random particle attributes.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Map a unit sample `u` in [0, 1) into the range.
    /// A zero-width range collapses to `min` instead of panicking.
    #[inline]
    pub fn lerp(&self, u: f64) -> f64 {
        self.min + u * (self.max - self.min)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Frame-rate target while the page is visible
    pub target_fps: f64,
    /// Frame-rate target while the page is hidden
    pub hidden_fps: f64,
    /// Upper bound on the device pixel ratio used for the backing store
    pub dpr_cap: f64,
    /// Viewports narrower than this get the mobile particle count
    pub mobile_breakpoint: f64,
    pub particle_count_desktop: usize,
    pub particle_count_mobile: usize,
    /// Maximum inter-particle link distance; also the spatial grid cell size
    pub max_link_distance: f64,
    pub max_line_opacity: f64,
    pub speed: Range,
    pub dot_radius: Range,
    pub pointer_link_distance: f64,
    pub pointer_line_opacity_max: f64,
    /// Radius inside which the pointer steers particles
    pub pointer_attraction_radius: f64,
    pub pointer_influence: f64,
    pub direction_wiggle: f64,
    pub boot_duration_ms: f64,
    pub boot_lerp_factor: f64,
    pub boot_radius_scale_start: f64,
    /// Per-axis distance under which a booting particle counts as arrived
    pub boot_snap_threshold: f64,
    /// Link opacity factor used for the single reduced-motion frame
    pub static_link_opacity: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            target_fps: 40.0,
            hidden_fps: 5.0,
            dpr_cap: 1.25,
            mobile_breakpoint: 768.0,
            particle_count_desktop: 80,
            particle_count_mobile: 50,
            max_link_distance: 140.0,
            max_line_opacity: 0.38,
            speed: Range::new(0.2, 0.6),
            dot_radius: Range::new(1.5, 2.5),
            pointer_link_distance: 220.0,
            pointer_line_opacity_max: 0.35,
            pointer_attraction_radius: 220.0,
            pointer_influence: 0.018,
            direction_wiggle: 0.02,
            boot_duration_ms: 1300.0,
            boot_lerp_factor: 0.08,
            boot_radius_scale_start: 0.4,
            boot_snap_threshold: 1.0,
            static_link_opacity: 1.0,
        }
    }
}

impl FieldConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Particle count for a viewport of the given logical width
    pub fn particle_count(&self, width: f64) -> usize {
        if width < self.mobile_breakpoint {
            self.particle_count_mobile
        } else {
            self.particle_count_desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config = FieldConfig::from_json("{}").unwrap();
        assert_eq!(config, FieldConfig::default());
    }

    #[test]
    fn partial_json_overrides_only_given_fields() {
        let config = FieldConfig::from_json(
            r#"{"target_fps": 60, "speed": {"min": 0.1, "max": 0.3}}"#,
        )
        .unwrap();
        assert_eq!(config.target_fps, 60.0);
        assert_eq!(config.speed, Range::new(0.1, 0.3));
        assert_eq!(config.max_link_distance, 140.0);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(FieldConfig::from_json(r#"{"target_fps": "fast"}"#).is_err());
    }

    #[test]
    fn particle_count_depends_on_breakpoint() {
        let config = FieldConfig::default();
        assert_eq!(config.particle_count(767.0), 50);
        assert_eq!(config.particle_count(768.0), 80);
        assert_eq!(config.particle_count(1024.0), 80);
        assert_eq!(config.particle_count(0.0), 50);
    }

    #[test]
    fn zero_width_range_collapses() {
        let r = Range::new(2.0, 2.0);
        assert_eq!(r.lerp(0.0), 2.0);
        assert_eq!(r.lerp(0.99), 2.0);
    }
}
