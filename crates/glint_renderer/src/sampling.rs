//! Rejection samplers used by materials and the thin-lens camera.

use glint_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform point strictly inside the unit sphere.
///
/// Draws points from the `[-1, 1]^3` cube until one has squared length < 1.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            2.0 * rng.gen::<f64>() - 1.0,
            2.0 * rng.gen::<f64>() - 1.0,
            2.0 * rng.gen::<f64>() - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Uniform point strictly inside the unit disk on the z = 0 plane.
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(2.0 * rng.gen::<f64>() - 1.0, 2.0 * rng.gen::<f64>() - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}
