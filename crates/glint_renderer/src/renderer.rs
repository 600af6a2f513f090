//! Core path tracing: the recursive color estimator and per-pixel sampling.

use glint_math::{Color, Interval, Ray};
use rand::{Rng, RngCore};

use crate::hittable::Geometry;
use crate::scanline::PixelState;
use crate::scene::Scene;

/// Bounce depth at which a path is cut off and contributes black.
pub const MAX_DEPTH: u32 = 50;

/// Lower bound on hit distance; avoids re-hitting the surface a ray left from.
pub const T_MIN: f64 = 0.001;

const SKY_BLUE: Color = Color::new(0.5, 0.7, 1.0);

/// Compute the color seen by a ray.
///
/// `depth` counts bounces so far; callers start at 0. Attenuation compounds
/// multiplicatively along the path.
pub fn ray_color(ray: &Ray, world: &Geometry, depth: u32, rng: &mut dyn RngCore) -> Color {
    let Some(rec) = world.hit(ray, Interval::from_min(T_MIN)) else {
        return sky_gradient(ray);
    };

    if depth >= MAX_DEPTH {
        return Color::BLACK;
    }

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => result.attenuation * ray_color(&result.scattered, world, depth + 1, rng),
        None => Color::BLACK,
    }
}

/// Vertical white-to-blue gradient used where rays escape the scene.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = ray.direction().normalize();
    let a = 0.5 * (unit_direction.y + 1.0);
    Color::WHITE.lerp(SKY_BLUE, a)
}

/// Trace `samples` more camera rays through `pixel` and fold them into its
/// running sum.
///
/// Returns the packed, averaged, gamma corrected value for display.
pub fn render_pixel(
    scene: &Scene,
    pixel: &mut PixelState,
    samples: u32,
    rng: &mut dyn RngCore,
) -> u32 {
    let width = scene.width() as f64;
    let height = scene.height() as f64;

    for _ in 0..samples {
        let s = (pixel.x as f64 + rng.gen::<f64>()) / width;
        let t = (pixel.y as f64 + rng.gen::<f64>()) / height;
        let ray = scene.camera().get_ray(s, t, rng);
        pixel.accumulated += ray_color(&ray, scene.world(), 0, rng);
    }
    pixel.samples += samples;

    pixel.display_value()
}
