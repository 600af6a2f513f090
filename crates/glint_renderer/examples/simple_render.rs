//! Simple progressive render example.
//!
//! Renders the three-sphere scene in two passes and saves it as PNG.

use glint_renderer::demo::{three_spheres, DemoScene};
use glint_renderer::{default_parallelism, render, ImageFileSink, PersistenceSink, Scene};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Glint Path Tracer - Simple Example");
    println!("==================================");

    let (width, height) = (400, 200);
    let camera = DemoScene::ThreeSpheres.camera(width as f64 / height as f64);
    let scene = Scene::new(width, height, vec![4, 60], camera, three_spheres())?;

    let threads = default_parallelism();
    println!("Rendering {}x{} @ {} spp on {} threads...", width, height, scene.total_samples(), threads);

    let handle = render(scene, threads)?;
    let pixels = handle.pixels().clone();
    let summary = handle.wait()?;
    println!("Rendered in {:?}", summary.elapsed);

    let output = Path::new("simple_render.png");
    ImageFileSink.persist(&pixels.snapshot(), width, height, output)?;
    println!("Saved to {}", output.display());

    Ok(())
}
