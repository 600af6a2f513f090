//! Glint - progressive CPU path tracing.
//!
//! A Monte Carlo path tracer over spheres that refines its estimate over a
//! schedule of passes, with scanlines distributed across a pool of workers
//! writing into a shared packed-pixel buffer.

mod camera;
mod hittable;
mod material;
mod pixel_buffer;
mod progressive;
mod renderer;
mod sampling;
mod scanline;
mod scene;
mod sphere;

pub mod demo;
pub mod settings;
pub mod sink;

pub use camera::Camera;
pub use hittable::{Geometry, HitRecord, HittableList};
pub use material::{Dielectric, Lambertian, Material, Metal, ScatterResult};
pub use pixel_buffer::PixelBuffer;
pub use progressive::{
    default_parallelism, render, LogObserver, PassStats, ProgressiveRenderer, RenderError, RenderHandle,
    RenderObserver, RenderSummary,
};
pub use renderer::{ray_color, render_pixel, sky_gradient, MAX_DEPTH, T_MIN};
pub use sampling::{random_in_unit_disk, random_in_unit_sphere};
pub use scanline::{generate_scanlines, render_scanline, PixelState, Scanline};
pub use scene::{Scene, SceneError};
pub use settings::{RenderSettings, SettingsError};
pub use sink::{DisplaySink, ImageFileSink, PersistenceSink, SinkError};
pub use sphere::Sphere;

/// Re-export the math types from glint_math
pub use glint_math::{reflect, refract, unpack_rgb, Color, Interval, Point3, Ray, Vec3};
