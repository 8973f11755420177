//! Indigo palette for the particle field

use crate::core::surface::Rgba;

pub mod colors {
    use super::Rgba;

    // === Particles ===
    pub const DOT: Rgba = Rgba::new(99, 102, 241, 0.8); // #6366F1 @ 80%

    // === Links ===
    // Alpha is replaced per link from its distance
    pub const LINK: Rgba = Rgba::new(99, 102, 241, 1.0);
}

/// Stroke width of particle-to-particle links
pub const LINK_WIDTH: f64 = 1.0;
/// Stroke width of pointer-to-particle links
pub const POINTER_LINK_WIDTH: f64 = 1.5;
