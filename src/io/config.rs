use crate::scene::palette::Palette;
use nalgebra::Vector3;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub orientation: OrientationConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_geometry")]
    pub geometry: PathBuf,
    /// Without a material file the geometry-only path is used.
    #[serde(default)]
    pub material: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            geometry: default_geometry(),
            material: None,
        }
    }
}

fn default_geometry() -> PathBuf {
    PathBuf::from("assets/cube.obj")
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_width")]
    pub width: usize,
    #[serde(default = "default_height")]
    pub height: usize,
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
    #[serde(default = "default_target_fps")]
    pub target_fps: usize,
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            samples: default_samples(),
            background: default_background(),
            target_fps: default_target_fps(),
            output: default_output(),
        }
    }
}

fn default_width() -> usize {
    800
}
fn default_height() -> usize {
    600
}
fn default_samples() -> usize {
    1
}
fn default_background() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_target_fps() -> usize {
    60
}
fn default_output() -> String {
    "output.png".to_string()
}

#[derive(Debug, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "default_position")]
    pub position: [f32; 3],
    #[serde(default = "default_target")]
    pub target: [f32; 3],
    #[serde(default = "default_up")]
    pub up: [f32; 3],
    /// Vertical field of view in degrees.
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: default_position(),
            target: default_target(),
            up: default_up(),
            fov: default_fov(),
            near: default_near(),
            far: default_far(),
        }
    }
}

fn default_position() -> [f32; 3] {
    [0.0, 4.0, 7.0]
}
fn default_target() -> [f32; 3] {
    [0.0, 2.0, -2.0]
}
fn default_up() -> [f32; 3] {
    [0.0, 2.0, 3.0]
}
fn default_fov() -> f32 {
    90.0
}
fn default_near() -> f32 {
    0.5
}
fn default_far() -> f32 {
    10.0
}

#[derive(Debug, Deserialize)]
pub struct OrientationConfig {
    /// Radians of rotation per pixel of pointer travel.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_model_scale")]
    pub model_scale: f32,
    /// `[vertical, horizontal]` radians, applied as a single pending delta in headless mode.
    #[serde(default)]
    pub initial: [f32; 2],
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
            model_scale: default_model_scale(),
            initial: [0.0, 0.0],
        }
    }
}

fn default_sensitivity() -> f32 {
    0.01
}
fn default_model_scale() -> f32 {
    2.0
}

#[derive(Debug, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_fallback")]
    pub fallback: [f32; 3],
    #[serde(default)]
    pub overrides: HashMap<String, [f32; 3]>,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            fallback: default_fallback(),
            overrides: HashMap::new(),
        }
    }
}

fn default_fallback() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

impl From<&PaletteConfig> for Palette {
    fn from(config: &PaletteConfig) -> Self {
        config
            .overrides
            .iter()
            .fold(Palette::new(Vector3::from(config.fallback)), |p, (name, rgb)| {
                p.with_override(name.clone(), Vector3::from(*rgb))
            })
    }
}
