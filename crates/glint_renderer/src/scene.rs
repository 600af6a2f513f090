//! Validated, immutable render input.

use thiserror::Error;

use crate::camera::Camera;
use crate::hittable::Geometry;

/// Errors that can occur while assembling a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("image dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("sample schedule must contain at least one pass")]
    EmptySchedule,

    #[error("pass {pass} of the sample schedule has zero samples")]
    ZeroSamples { pass: usize },

    #[error("invalid camera: {0}")]
    InvalidCamera(&'static str),
}

/// Everything the renderer needs. Read-only once built.
#[derive(Debug, Clone)]
pub struct Scene {
    width: u32,
    height: u32,
    schedule: Vec<u32>,
    camera: Camera,
    world: Geometry,
}

impl Scene {
    /// Validate the inputs and initialize the camera.
    ///
    /// `schedule` holds the samples per pixel drawn in each pass, e.g.
    /// `[1, 99]` for a quick preview followed by the bulk of the work.
    pub fn new(
        width: u32,
        height: u32,
        schedule: Vec<u32>,
        mut camera: Camera,
        world: impl Into<Geometry>,
    ) -> Result<Self, SceneError> {
        if width == 0 || height == 0 {
            return Err(SceneError::ZeroDimension { width, height });
        }
        if schedule.is_empty() {
            return Err(SceneError::EmptySchedule);
        }
        if let Some(pass) = schedule.iter().position(|&samples| samples == 0) {
            return Err(SceneError::ZeroSamples { pass });
        }
        camera.validate()?;
        camera.initialize();

        Ok(Self {
            width,
            height,
            schedule,
            camera,
            world: world.into(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Samples per pixel for each pass, in order.
    pub fn schedule(&self) -> &[u32] {
        &self.schedule
    }

    /// Samples per pixel once every pass has run.
    pub fn total_samples(&self) -> u32 {
        self.schedule.iter().sum()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn world(&self) -> &Geometry {
        &self.world
    }
}
