//! Thin-lens camera for ray generation.

use glint_math::{Point3, Ray, Vec3};
use rand::RngCore;

use crate::sampling::random_in_unit_disk;
use crate::scene::SceneError;

/// Camera for generating rays into the scene.
///
/// Configure with the `with_*` builders, then call [`Camera::initialize`]
/// before generating rays. `Scene::new` does this for you.
#[derive(Debug, Clone)]
pub struct Camera {
    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f64,         // Vertical field of view in degrees
    aspect_ratio: f64, // Width over height
    aperture: f64,     // Lens diameter, 0 for a pinhole
    focus_dist: f64,   // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    origin: Point3,
    lower_left_corner: Point3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self {
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            aspect_ratio: 2.0,
            aperture: 0.0,
            focus_dist: 1.0,
            // Cached values (initialized to defaults)
            origin: Vec3::ZERO,
            lower_left_corner: Vec3::ZERO,
            horizontal: Vec3::ZERO,
            vertical: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            lens_radius: 0.0,
        }
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set the image aspect ratio (width / height).
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Initialize the camera (must be called before generating rays).
    pub fn initialize(&mut self) {
        let theta = self.vfov.to_radians();
        let half_height = (theta / 2.0).tan();
        let half_width = self.aspect_ratio * half_height;

        self.origin = self.look_from;
        self.lens_radius = self.aperture / 2.0;

        // w points from the target back to the eye
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        self.lower_left_corner = self.origin
            - half_width * self.focus_dist * self.u
            - half_height * self.focus_dist * self.v
            - self.focus_dist * self.w;
        self.horizontal = 2.0 * half_width * self.focus_dist * self.u;
        self.vertical = 2.0 * half_height * self.focus_dist * self.v;
    }

    /// Reject parameters that cannot produce a usable view.
    pub fn validate(&self) -> Result<(), SceneError> {
        let reason = if !(self.vfov > 0.0 && self.vfov < 180.0) {
            Some("vertical field of view must be in (0, 180) degrees")
        } else if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            Some("aspect ratio must be positive")
        } else if !(self.aperture.is_finite() && self.aperture >= 0.0) {
            Some("aperture must be non-negative")
        } else if !(self.focus_dist.is_finite() && self.focus_dist > 0.0) {
            Some("focus distance must be positive")
        } else if (self.look_from - self.look_at).length_squared() == 0.0 {
            Some("look-from and look-at must differ")
        } else if self.vup.cross(self.look_from - self.look_at).length_squared() == 0.0 {
            Some("up vector must not be parallel to the view direction")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(SceneError::InvalidCamera(reason)),
            None => Ok(()),
        }
    }

    /// Generate a ray through normalized image-plane coordinates `(s, t)`.
    ///
    /// `(0, 0)` is the bottom-left of the view, `(1, 1)` the top-right. With a
    /// zero aperture no random numbers are drawn.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let offset = if self.lens_radius > 0.0 {
            let rd = self.lens_radius * random_in_unit_disk(rng);
            self.u * rd.x + self.v * rd.y
        } else {
            Vec3::ZERO
        };

        let focus_point = self.focus_point(s, t);
        Ray::new(self.origin + offset, focus_point - self.origin - offset)
    }

    /// Point on the focus plane hit by every ray for `(s, t)`.
    pub fn focus_point(&self, s: f64, t: f64) -> Point3 {
        self.lower_left_corner + s * self.horizontal + t * self.vertical
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
