use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glint_renderer::{
    DisplaySink, ImageFileSink, LogObserver, PersistenceSink, ProgressiveRenderer, RenderSettings,
};

/// How often the preview is refreshed while a render runs.
const PRESENT_INTERVAL: Duration = Duration::from_millis(500);

/// Reports how much of the frame has been painted so far.
struct CoverageSink {
    last_percent: usize,
}

impl DisplaySink for CoverageSink {
    fn present(&mut self, pixels: &[u32], width: u32, height: u32) {
        let painted = pixels.iter().filter(|&&p| p != 0).count();
        let percent = painted * 100 / pixels.len().max(1);
        if percent != self.last_percent {
            log::debug!("Preview {}x{}: {}% painted", width, height, percent);
            self.last_percent = percent;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Starting Glint");

    let settings = match std::env::args().nth(1) {
        Some(path) => RenderSettings::from_json_file(&path)
            .with_context(|| format!("loading settings from {path}"))?,
        None => RenderSettings::default(),
    };
    log::info!(
        "Rendering {:?} at {}x{} with passes {:?}",
        settings.scene,
        settings.width,
        settings.height,
        settings.passes
    );

    let scene = settings.build_scene()?;
    let mut renderer = ProgressiveRenderer::new(scene)
        .with_parallelism(settings.parallelism())
        .with_observer(Arc::new(LogObserver));
    if let Some(seed) = settings.seed {
        renderer = renderer.with_seed(seed);
    }

    let handle = renderer.start()?;
    handle.present_until_complete(&mut CoverageSink { last_percent: 0 }, PRESENT_INTERVAL)?;

    let pixels = Arc::clone(handle.pixels());
    let summary = handle.wait()?;
    log::info!(
        "Finished {} passes, {} samples per pixel in {:?}",
        summary.passes,
        summary.samples_per_pixel,
        summary.elapsed
    );

    ImageFileSink
        .persist(&pixels.snapshot(), pixels.width(), pixels.height(), &settings.output)
        .with_context(|| format!("saving {}", settings.output.display()))?;

    Ok(())
}
