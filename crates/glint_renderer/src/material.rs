//! Surface materials and how they scatter incoming rays.
//!
//! `Material` is a closed set of variants; `scatter` dispatches with an
//! exhaustive match. Every random draw comes from the generator passed in by
//! the caller, which is owned by a single render worker.

use glint_math::{reflect, refract, Color, Ray};
use rand::{Rng, RngCore};

use crate::hittable::HitRecord;
use crate::sampling::random_in_unit_sphere;

/// Result of a successful scatter.
#[derive(Debug, Clone, Copy)]
pub struct ScatterResult {
    /// Per-channel fraction of the scattered light that survives
    pub attenuation: Color,
    /// The outgoing ray
    pub scattered: Ray,
}

/// A surface material. Immutable and shared read-only across workers.
#[derive(Debug, Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
}

impl Material {
    /// Diffuse material with the given albedo.
    pub fn lambertian(albedo: Color) -> Self {
        Material::Lambertian(Lambertian::new(albedo))
    }

    /// Specular material; `fuzz` is clamped to [0, 1].
    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Material::Metal(Metal::new(albedo, fuzz))
    }

    /// Clear refractive material.
    pub fn dielectric(refractive_index: f64) -> Self {
        Material::Dielectric(Dielectric::new(refractive_index))
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<ScatterResult> {
        match self {
            Material::Lambertian(m) => m.scatter(ray_in, rec, rng),
            Material::Metal(m) => m.scatter(ray_in, rec, rng),
            Material::Dielectric(m) => m.scatter(ray_in, rec, rng),
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Color,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self { albedo }
    }

    pub fn albedo(&self) -> Color {
        self.albedo
    }

    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        // Target point in the unit sphere tangent to the surface at p
        let target = rec.p + rec.normal + random_in_unit_sphere(rng);
        Some(ScatterResult {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, target - rec.p),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    pub fn fuzz(&self) -> f64 {
        self.fuzz
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let mut direction = reflect(ray_in.direction().normalize(), rec.normal);
        if self.fuzz > 0.0 {
            direction += self.fuzz * random_in_unit_sphere(rng);
        }

        // Rays pushed below the surface are absorbed
        if direction.dot(rec.normal) > 0.0 {
            Some(ScatterResult {
                attenuation: self.albedo,
                scattered: Ray::new(rec.p, direction),
            })
        } else {
            None
        }
    }
}

/// Dielectric (glass) material. Never absorbs.
#[derive(Debug, Clone)]
pub struct Dielectric {
    refractive_index: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `refractive_index`: 1.5 = glass, 2.4 = diamond
    pub fn new(refractive_index: f64) -> Self {
        Self { refractive_index }
    }

    pub fn refractive_index(&self) -> f64 {
        self.refractive_index
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, refractive_index: f64) -> f64 {
        let r0 = ((1.0 - refractive_index) / (1.0 + refractive_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterResult> {
        let direction = ray_in.direction();
        let d_dot_n = direction.dot(rec.normal);

        // Leaving the material when travelling along the normal
        let (outward_normal, ni_over_nt, cosine) = if d_dot_n > 0.0 {
            (
                -rec.normal,
                self.refractive_index,
                (self.refractive_index * d_dot_n / direction.length()).min(1.0),
            )
        } else {
            (
                rec.normal,
                1.0 / self.refractive_index,
                -d_dot_n / direction.length(),
            )
        };

        let scattered_direction = match refract(direction, outward_normal, ni_over_nt) {
            Some(refracted)
                if rng.gen::<f64>() >= Self::reflectance(cosine, self.refractive_index) =>
            {
                refracted
            }
            // Total internal reflection, or the Fresnel draw chose reflection
            _ => reflect(direction, rec.normal),
        };

        Some(ScatterResult {
            attenuation: Color::WHITE,
            scattered: Ray::new(rec.p, scattered_direction),
        })
    }
}
