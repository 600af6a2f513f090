//! Sphere primitive for ray tracing.

use glint_math::{Interval, Point3, Ray};

use crate::hittable::HitRecord;
use crate::material::Material;

/// A sphere primitive.
///
/// A negative radius keeps the same surface but turns the normal inward,
/// which is how hollow glass shells are modelled.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Point3,
    radius: f64,
    material: Material,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Point3, radius: f64, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Solve `|O + tD - C|^2 = r^2` and return the nearest root inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let oc = ray.origin() - self.center;
        let a = ray.direction().length_squared();
        let b = oc.dot(ray.direction());
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = b * b - a * c;
        if discriminant <= 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Nearer root first
        [(-b - sqrtd) / a, (-b + sqrtd) / a]
            .into_iter()
            .find(|&root| ray_t.surrounds(root))
            .map(|t| {
                let p = ray.at(t);
                HitRecord {
                    t,
                    p,
                    normal: (p - self.center) / self.radius,
                    material: &self.material,
                }
            })
    }
}
