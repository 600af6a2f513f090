//! Render settings loaded from JSON.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::demo::DemoScene;
use crate::progressive::default_parallelism;
use crate::scene::{Scene, SceneError};

/// Errors that can occur while loading settings or building their scene.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// User-facing render configuration. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel drawn in each pass
    pub passes: Vec<u32>,
    /// Worker count; `None` uses every hardware thread
    pub parallelism: Option<usize>,
    /// Master seed for reproducible renders
    pub seed: Option<u64>,
    pub scene: DemoScene,
    pub output: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            passes: vec![1, 99],
            parallelism: None,
            seed: None,
            scene: DemoScene::default(),
            output: PathBuf::from("output.png"),
        }
    }
}

impl RenderSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Worker count to render with.
    pub fn parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(default_parallelism)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Build the selected demo scene. A fixed seed also fixes the scene layout.
    pub fn build_scene(&self) -> Result<Scene, SettingsError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let world = self.scene.world(&mut rng);
        let camera = self.scene.camera(self.aspect_ratio());
        Ok(Scene::new(self.width, self.height, self.passes.clone(), camera, world)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = RenderSettings::default();
        assert_eq!((settings.width, settings.height), (800, 400));
        assert_eq!(settings.passes, vec![1, 99]);
        assert_eq!(settings.scene, DemoScene::Cover);
        assert_eq!(settings.output, PathBuf::from("output.png"));
        assert!(settings.parallelism() >= 1);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = RenderSettings::from_json_str(
            r#"{ "width": 64, "passes": [2, 2], "parallelism": 3, "scene": "two-spheres" }"#,
        )
        .unwrap();
        assert_eq!(settings.width, 64);
        assert_eq!(settings.height, 400);
        assert_eq!(settings.passes, vec![2, 2]);
        assert_eq!(settings.parallelism(), 3);
        assert_eq!(settings.scene, DemoScene::TwoSpheres);
    }

    #[test]
    fn test_bad_json() {
        let err = RenderSettings::from_json_str(r#"{ "width": -1 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("glint_settings_does_not_exist.json");
        let err = RenderSettings::from_json_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("glint_settings_{}.json", std::process::id()));
        let settings = RenderSettings {
            seed: Some(42),
            scene: DemoScene::ThreeSpheres,
            ..Default::default()
        };
        fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let loaded = RenderSettings::from_json_file(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_build_scene() {
        let settings = RenderSettings {
            width: 40,
            height: 20,
            seed: Some(7),
            ..Default::default()
        };
        let scene = settings.build_scene().unwrap();
        assert_eq!(scene.width(), 40);
        assert_eq!(scene.total_samples(), 100);

        let empty = RenderSettings {
            passes: Vec::new(),
            ..settings
        };
        assert!(matches!(
            empty.build_scene(),
            Err(SettingsError::Scene(SceneError::EmptySchedule))
        ));
    }
}
