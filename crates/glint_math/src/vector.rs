//! Reflection and refraction of direction vectors.

use crate::Vec3;

/// Mirror `v` about the surface normal `n` (unit length).
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Bend `v` through a surface with normal `n` using Snell's law.
///
/// `ni_over_nt` is the ratio of refractive indices (incident over transmitted).
/// `n` must face the incident side. Returns `None` on total internal
/// reflection.
pub fn refract(v: Vec3, n: Vec3, ni_over_nt: f64) -> Option<Vec3> {
    let uv = v.normalize();
    let dt = uv.dot(n);
    let discriminant = 1.0 - ni_over_nt * ni_over_nt * (1.0 - dt * dt);
    if discriminant > 0.0 {
        Some(ni_over_nt * (uv - n * dt) - n * discriminant.sqrt())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_reflect() {
        let v = Vec3::new(1.0, -1.0, 0.0);
        assert_eq!(reflect(v, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(reflect(Vec3::NEG_Y, Vec3::Y), Vec3::Y);
    }

    #[test]
    fn test_refract_straight_through() {
        // Normal incidence passes straight through regardless of ratio
        let out = refract(Vec3::NEG_Y, Vec3::Y, 1.0 / 1.5).expect("refracts");
        assert!((out - Vec3::NEG_Y).length() < EPS);
    }

    #[test]
    fn test_refract_snell() {
        let incoming = Vec3::new(1.0, -1.0, 0.0);
        let ratio = 1.0 / 1.5;
        let out = refract(incoming, Vec3::Y, ratio).expect("refracts");

        let sin_in = incoming.normalize().x;
        let sin_out = out.normalize().x;
        assert!((sin_out - ratio * sin_in).abs() < EPS);
        assert!(out.y < 0.0);
    }

    #[test]
    fn test_refract_total_internal_reflection() {
        // Grazing ray leaving glass
        let incoming = Vec3::new(1.0, -0.1, 0.0);
        assert!(refract(incoming, Vec3::Y, 1.5).is_none());
    }
}
