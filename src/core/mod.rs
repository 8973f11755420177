//! Platform-agnostic core module - shared between the browser host and CLI

pub mod config;
pub mod field;
pub mod grid;
pub mod pacing;
pub mod particle;
pub mod projects;
pub mod surface;

pub use config::{FieldConfig, Range};
pub use field::{FrameOutcome, FrameStats, Mode, ParticleField, Phase};
pub use grid::{Link, SpatialGrid};
pub use pacing::{FrameLimiter, Visibility};
pub use particle::{create_particles, Particle, Point, Viewport};
pub use projects::{category_for, collect_pages, Category, Project, ProjectCache, ProjectQuery, RepoFilter, RepoRecord};
pub use surface::{DrawCommand, RecordingSurface, Rgba, Surface};
