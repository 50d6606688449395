//! Viewer configuration.
//!
//! Settings come from an optional TOML file and are then overridden by command-line
//! flags. The file is only ever read. Every field has a default, so a partial file (or
//! none at all) is fine.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::Parser;
use serde::Deserialize;

use crate::{
    data_structures::material::Material,
    render::{DEFAULT_PATCH_SIZE, PrimitiveMode},
};

/// Command-line flags.
#[derive(Debug, Default, Parser)]
#[command(name = "illumination", version, about = "Interactive Phong-lit mesh viewer")]
pub struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Geometry file with `v` and `f` records
    #[arg(short, long)]
    pub mesh: Option<PathBuf>,

    /// Image used as diffuse and specular texture
    #[arg(short, long)]
    pub texture: Option<PathBuf>,

    /// triangles, points or patches
    #[arg(short, long)]
    pub render_mode: Option<RenderMode>,
}

/// How the object is drawn each frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    #[default]
    Triangles,
    Points,
    Patches,
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "triangles" => Ok(RenderMode::Triangles),
            "points" => Ok(RenderMode::Points),
            "patches" => Ok(RenderMode::Patches),
            other => Err(format!(
                "unknown render mode '{}', expected triangles, points or patches",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1000,
            title: "Illumination".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Units per second.
    pub speed: f32,
    /// Degrees per pixel of mouse movement.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 7.0],
            speed: 3.0,
            sensitivity: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            ambient: [0.1; 3],
            diffuse: [0.7; 3],
            specular: [0.5; 3],
        }
    }
}

impl From<&MaterialConfig> for Material {
    fn from(config: &MaterialConfig) -> Self {
        Material::new(config.ambient.into(), config.diffuse.into(), config.specular.into())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub mode: RenderMode,
    pub point_size: f32,
    pub patch_size: u32,
    pub tessellation_level: f32,
    /// Spin rate of the rotation keys.
    pub spin_speed: f32,
    pub light_position: [f32; 3],
    pub clear_color: [f64; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            mode: RenderMode::Triangles,
            point_size: 10.0,
            patch_size: DEFAULT_PATCH_SIZE,
            tessellation_level: 5.0,
            spin_speed: 40.0,
            light_position: [5.0, 5.0, 5.0],
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn primitive_mode(&self) -> PrimitiveMode {
        match self.mode {
            RenderMode::Triangles => PrimitiveMode::Triangles,
            RenderMode::Points => PrimitiveMode::Points,
            RenderMode::Patches => PrimitiveMode::Patches(self.patch_size),
        }
    }

    pub fn clear_colour(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color;
        wgpu::Color { r, g, b, a }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub material: MaterialConfig,
    pub render: RenderConfig,
    pub mesh: PathBuf,
    pub texture: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            material: MaterialConfig::default(),
            render: RenderConfig::default(),
            mesh: PathBuf::from("assets/eight.txt"),
            texture: None,
        }
    }
}

impl Config {
    /// Read `path`, or return defaults if it is missing or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config file at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config {:?}: {}, using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// File settings (when `--config` is given) with the other flags applied on top.
    pub fn from_args(args: &Args) -> Self {
        let mut config = args
            .config
            .as_deref()
            .map(Self::load)
            .unwrap_or_default();
        config.apply(args);
        config
    }

    pub fn apply(&mut self, args: &Args) {
        if let Some(mesh) = &args.mesh {
            self.mesh = mesh.clone();
        }
        if let Some(texture) = &args.texture {
            self.texture = Some(texture.clone());
        }
        if let Some(mode) = args.render_mode {
            self.render.mode = mode;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_scene() {
        let config = Config::default();
        assert_eq!((config.window.width, config.window.height), (1800, 1000));
        assert_eq!(config.window.title, "Illumination");
        assert_eq!(config.camera.position, [0.0, 0.0, 7.0]);
        assert_eq!(config.render.tessellation_level, 5.0);
        assert_eq!(config.render.primitive_mode(), PrimitiveMode::Triangles);
        assert_eq!(config.mesh, PathBuf::from("assets/eight.txt"));
        assert_eq!(Material::from(&config.material), Material::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
            mesh = "models/torus.txt"

            [render]
            mode = "patches"
            patch_size = 16

            [camera]
            speed = 6.0
            "#,
        )
        .unwrap();
        assert_eq!(config.mesh, PathBuf::from("models/torus.txt"));
        assert_eq!(config.render.primitive_mode(), PrimitiveMode::Patches(16));
        assert_eq!(config.render.point_size, 10.0);
        assert_eq!(config.camera.speed, 6.0);
        assert_eq!(config.camera.sensitivity, 0.1);
        assert_eq!(config.window, WindowConfig::default());
    }

    #[test]
    fn flags_override_file_values() {
        let args = Args::parse_from([
            "illumination",
            "--mesh",
            "sphere.txt",
            "--render-mode",
            "points",
            "--texture",
            "wood.png",
        ]);
        let config = Config::from_args(&args);
        assert_eq!(config.mesh, PathBuf::from("sphere.txt"));
        assert_eq!(config.texture, Some(PathBuf::from("wood.png")));
        assert_eq!(config.render.mode, RenderMode::Points);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load(Path::new("does/not/exist.toml"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn unknown_render_mode_is_rejected() {
        assert!("Patches".parse::<RenderMode>().is_ok());
        assert!("lines".parse::<RenderMode>().is_err());
        assert!(Args::try_parse_from(["illumination", "-r", "lines"]).is_err());
    }
}
