//! Contains structs for `objview.toml`.

use anyhow::{Context, Result};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use log::info;
use serde::Deserialize;

/// Whole viewer configuration. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub appearance: AppearanceConfig,
    pub shader_directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub field_of_view: f32,
    pub initial_zoom: f32,
    pub zoom_step: f32,
    /// Degrees of rotation per dragged pixel.
    pub rotation_sensitivity: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppearanceConfig {
    pub background: [f32; 3],
    /// Colour of faces without a usable material.
    pub model_color: [f32; 3],
    /// Colour of the cube shown when the model could not be loaded.
    pub fallback_color: [f32; 3],
    pub light_position: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> ViewerConfig {
        ViewerConfig {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            appearance: AppearanceConfig::default(),
            shader_directory: PathBuf::from("shaders"),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> WindowConfig {
        WindowConfig {
            title: "OBJ Model Viewer".into(),
            width: 800,
            height: 600,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> CameraConfig {
        CameraConfig {
            field_of_view: 45.0,
            initial_zoom: -5.0,
            zoom_step: 0.5,
            rotation_sensitivity: 0.5,
        }
    }
}

impl Default for AppearanceConfig {
    fn default() -> AppearanceConfig {
        AppearanceConfig {
            background: [0.2, 0.2, 0.2],
            model_color: [0.7, 0.7, 0.9],
            fallback_color: [1.0, 0.5, 0.0],
            light_position: [2.0, 2.0, 3.0],
        }
    }
}

impl ViewerConfig {
    /// Parses the configuration from TOML text.
    pub fn from_toml(source: &str) -> Result<ViewerConfig> {
        Ok(toml::from_str(source)?)
    }

    /// Reads the configuration file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<ViewerConfig> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {:?}, using defaults", path);
            return Ok(ViewerConfig::default());
        }

        let source = read_to_string(path)
            .with_context(|| format!("Failed to read the configuration {:?}", path))?;
        let config = ViewerConfig::from_toml(&source)
            .with_context(|| format!("Failed to parse the configuration {:?}", path))?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use tempfile::NamedTempFile;

    #[test]
    fn empty_source_gives_defaults() {
        let config = ViewerConfig::from_toml("").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.camera.initial_zoom, -5.0);
        assert_eq!(config.appearance.model_color, [0.7, 0.7, 0.9]);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ViewerConfig::from_toml(
            r#"
            shader_directory = "assets/glsl"

            [window]
            width = 1280

            [camera]
            zoom_step = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(config.shader_directory, PathBuf::from("assets/glsl"));
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "OBJ Model Viewer");
        assert_eq!(config.camera.zoom_step, 0.25);
        assert_eq!(config.camera.rotation_sensitivity, 0.5);
        assert_eq!(config.appearance, AppearanceConfig::default());
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(ViewerConfig::from_toml("[window]\nwidth = \"wide\"").is_err());
        assert!(ViewerConfig::from_toml("[appearance]\nbackground = [1.0, 0.0]").is_err());
    }

    #[test]
    fn load_reads_file_or_falls_back() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[appearance]\nbackground = [0.0, 0.0, 0.0]").unwrap();
        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.appearance.background, [0.0, 0.0, 0.0]);

        let directory = tempfile::tempdir().unwrap();
        let missing = ViewerConfig::load(directory.path().join("absent.toml")).unwrap();
        assert_eq!(missing, ViewerConfig::default());
    }
}
