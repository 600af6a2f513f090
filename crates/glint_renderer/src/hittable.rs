//! Scene geometry and ray-object intersection records.

use glint_math::{Interval, Point3, Ray, Vec3};

use crate::material::Material;
use crate::sphere::Sphere;

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Parameter t where the intersection occurs
    pub t: f64,
    /// Point of intersection
    pub p: Point3,
    /// Unit surface normal, `(p - center) / radius` for spheres.
    ///
    /// Not flipped toward the ray; a negative radius yields an inward normal.
    pub normal: Vec3,
    /// Material at the intersection point
    pub material: &'a Material,
}

/// Anything a ray can be tested against.
///
/// Built once before rendering and never mutated while workers read it.
#[derive(Debug, Clone)]
pub enum Geometry {
    Sphere(Sphere),
    List(HittableList),
}

impl Geometry {
    /// Test if a ray hits this object strictly inside `ray_t`.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        match self {
            Geometry::Sphere(sphere) => sphere.hit(ray, ray_t),
            Geometry::List(list) => list.hit(ray, ray_t),
        }
    }
}

impl From<Sphere> for Geometry {
    fn from(sphere: Sphere) -> Self {
        Geometry::Sphere(sphere)
    }
}

impl From<HittableList> for Geometry {
    fn from(list: HittableList) -> Self {
        Geometry::List(list)
    }
}

/// An ordered list of geometry, hit-tested by linear scan.
#[derive(Debug, Clone, Default)]
pub struct HittableList {
    objects: Vec<Geometry>,
}

impl HittableList {
    /// Create a new empty hittable list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the list.
    pub fn add(&mut self, object: impl Into<Geometry>) {
        self.objects.push(object.into());
    }

    /// Get the number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Geometry> {
        self.objects.iter()
    }

    /// Closest hit among all members.
    ///
    /// The upper bound shrinks to each accepted hit, so a later member only
    /// replaces the result when it is strictly closer.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for object in &self.objects {
            let max = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = object.hit(ray, ray_t.with_max(max)) {
                closest = Some(rec);
            }
        }

        closest
    }
}

impl FromIterator<Geometry> for HittableList {
    fn from_iter<I: IntoIterator<Item = Geometry>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<Sphere> for HittableList {
    fn from_iter<I: IntoIterator<Item = Sphere>>(iter: I) -> Self {
        iter.into_iter().map(Geometry::from).collect()
    }
}
