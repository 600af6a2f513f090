//! Glint math - vector, ray and color primitives shared by the renderer.
//!
//! Positions and directions are both `glam::DVec3`; `Point3` is an alias
//! kept for readability at call sites that deal with positions.

// Re-export glam's double precision vector as the crate-wide Vec3
pub use glam::DVec3 as Vec3;

/// A position in world space.
pub type Point3 = Vec3;

mod color;
mod interval;
mod ray;
mod vector;

pub use color::{unpack_rgb, Color};
pub use interval::Interval;
pub use ray::Ray;
pub use vector::{reflect, refract};

