//! Ready-made worlds and matching cameras for the viewer and tests.

use glint_math::{Color, Vec3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::hittable::HittableList;
use crate::material::Material;
use crate::sphere::Sphere;

/// Selects one of the built-in scenes by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemoScene {
    TwoSpheres,
    ThreeSpheres,
    #[default]
    Cover,
}

impl DemoScene {
    /// Build the world. Only the cover scene draws from `rng`.
    pub fn world(&self, rng: &mut dyn RngCore) -> HittableList {
        match self {
            DemoScene::TwoSpheres => two_spheres(),
            DemoScene::ThreeSpheres => three_spheres(),
            DemoScene::Cover => cover_scene(rng),
        }
    }

    /// Camera framing this scene at the given aspect ratio.
    pub fn camera(&self, aspect_ratio: f64) -> Camera {
        let camera = match self {
            DemoScene::TwoSpheres => Camera::new()
                .with_position(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y)
                .with_lens(90.0, 0.0, 1.0),
            DemoScene::ThreeSpheres => {
                let look_from = Vec3::new(3.0, 3.0, 2.0);
                let look_at = Vec3::new(0.0, 0.0, -1.0);
                Camera::new()
                    .with_position(look_from, look_at, Vec3::Y)
                    .with_lens(20.0, 0.5, look_from.distance(look_at))
            }
            DemoScene::Cover => Camera::new()
                .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
                .with_lens(20.0, 0.1, 10.0),
        };
        camera.with_aspect_ratio(aspect_ratio)
    }
}

/// Grey diffuse sphere resting on a huge ground sphere.
pub fn two_spheres() -> HittableList {
    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Material::lambertian(Color::new(0.5, 0.5, 0.5)),
    ));
    world.add(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Material::lambertian(Color::new(0.5, 0.5, 0.5)),
    ));
    world
}

/// Diffuse, metal and hollow glass spheres side by side.
pub fn three_spheres() -> HittableList {
    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(0.0, -100.5, -1.0),
        100.0,
        Material::lambertian(Color::new(0.8, 0.8, 0.0)),
    ));
    world.add(Sphere::new(
        Vec3::new(0.0, 0.0, -1.0),
        0.5,
        Material::lambertian(Color::new(0.1, 0.2, 0.5)),
    ));
    world.add(Sphere::new(
        Vec3::new(1.0, 0.0, -1.0),
        0.5,
        Material::metal(Color::new(0.8, 0.6, 0.2), 0.3),
    ));
    // Glass shell: outer surface plus an inverted inner one
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), 0.5, Material::dielectric(1.5)));
    world.add(Sphere::new(Vec3::new(-1.0, 0.0, -1.0), -0.45, Material::dielectric(1.5)));
    world
}

/// Field of small random spheres around three large ones.
pub fn cover_scene(rng: &mut dyn RngCore) -> HittableList {
    let mut world = HittableList::new();

    // Ground
    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Material::lambertian(Color::new(0.5, 0.5, 0.5)),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let center = Vec3::new(
                a as f64 + 0.9 * rng.gen::<f64>(),
                0.2,
                b as f64 + 0.9 * rng.gen::<f64>(),
            );
            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let choose_mat: f64 = rng.gen();
            let material = if choose_mat < 0.8 {
                let albedo = Color::new(
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                    rng.gen::<f64>() * rng.gen::<f64>(),
                );
                Material::lambertian(albedo)
            } else if choose_mat < 0.95 {
                let albedo = Color::new(
                    0.5 * (1.0 + rng.gen::<f64>()),
                    0.5 * (1.0 + rng.gen::<f64>()),
                    0.5 * (1.0 + rng.gen::<f64>()),
                );
                Material::metal(albedo, 0.5 * rng.gen::<f64>())
            } else {
                Material::dielectric(1.5)
            };
            world.add(Sphere::new(center, 0.2, material));
        }
    }

    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Material::dielectric(1.5)));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Material::lambertian(Color::new(0.4, 0.2, 0.1)),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Material::metal(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    log::debug!("Cover scene built with {} spheres", world.len());
    world
}
