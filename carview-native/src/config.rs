use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::Context;
use carview_core::{ShadowVolume, SkyboxVariant, Speeds};
use glam::Vec3;
use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────────
//   Viewer configuration
//
//   Every section is `#[serde(default)]`, so a config file only
//   needs the values it changes:
//
//     { "camera": { "speeds": { "movement": 25.0 } } }
// ──────────────────────────────────────────────────────────────
//

pub const DEFAULT_CONFIG_FILE: &str = "carview.json";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig
{
  pub window: WindowConfig,
  pub camera: CameraConfig,
  pub projection: ProjectionConfig,
  pub shadow: ShadowConfig,
  pub assets: AssetConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig
{
  pub width: u32,
  pub height: u32,
  pub title: String,
}

impl Default for WindowConfig
{
  fn default() -> Self
  {
    Self { width: 1024, height: 768, title: "Carview".to_string() }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig
{
  pub position: Vec3,
  pub target: Vec3,
  pub up: Vec3,
  pub speeds: Speeds,
  /// Degrees of rotation per pixel of mouse motion.
  pub sensitivity: f32,
}

impl Default for CameraConfig
{
  fn default() -> Self
  {
    Self {
      position: Vec3::new(0.0, 100.0, 3.0),
      target: Vec3::new(0.0, 0.0, -10.0),
      up: Vec3::new(0.0, 50.0, 0.0),
      speeds: Speeds::default(),
      sensitivity: 0.1,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig
{
  pub znear: f32,
  pub zfar: f32,
  /// The skybox keeps its own fixed projection, independent of camera zoom.
  pub skybox_fov: f32,
  pub skybox_zfar: f32,
}

impl Default for ProjectionConfig
{
  fn default() -> Self
  {
    Self { znear: 0.1, zfar: 5000.0, skybox_fov: 45.0, skybox_zfar: 1000.0 }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig
{
  /// Width and height of the square shadow map, in texels.
  pub map_size: u32,
  pub volume: ShadowVolume,
}

impl Default for ShadowConfig
{
  fn default() -> Self
  {
    Self { map_size: 2048, volume: ShadowVolume::default() }
  }
}

/// Skybox faces are listed +X, -X, +Y, -Y, +Z, -Z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig
{
  pub map: PathBuf,
  pub car: PathBuf,
  pub skybox_day: [PathBuf; 6],
  pub skybox_night: [PathBuf; 6],
}

impl Default for AssetConfig
{
  fn default() -> Self
  {
    Self {
      map: PathBuf::from("models/Map/NewMap.obj"),
      car: PathBuf::from("models/Car/Challenger.obj"),
      skybox_day: faces(["right", "left", "top", "bottom", "back", "front"]),
      skybox_night: faces([
        "nightsky_rt",
        "nightsky_lf",
        "nightsky_up",
        "nightsky_dn",
        "nightsky_bk",
        "nightsky_ft",
      ]),
    }
  }
}

fn faces(names: [&str; 6]) -> [PathBuf; 6]
{
  names.map(|name| PathBuf::from(format!("skybox/{name}.tga")))
}

//
// ──────────────────────────────────────────────────────────────
//   Loading
// ──────────────────────────────────────────────────────────────
//

impl ViewerConfig
{
  /// Explicit path first, then `carview.json` in the working directory, then defaults.
  pub fn discover(explicit: Option<OsString>) -> anyhow::Result<Self>
  {
    if let Some(path) = explicit
    {
      return Self::load(Path::new(&path));
    }

    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    if fallback.is_file()
    {
      return Self::load(fallback);
    }

    log::info!("no {DEFAULT_CONFIG_FILE} found, using built-in defaults");
    Ok(Self::default())
  }

  /// Read a JSON config. Relative asset paths resolve against the file's directory.
  pub fn load(path: &Path) -> anyhow::Result<Self>
  {
    let text =
      std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let mut config: Self =
      serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;

    if let Some(dir) = path.parent()
    {
      config.assets.resolve_against(dir);
    }

    log::info!("loaded configuration from {}", path.display());
    Ok(config)
  }
}

impl AssetConfig
{
  pub fn skybox_faces(&self, variant: SkyboxVariant) -> &[PathBuf; 6]
  {
    match variant
    {
      SkyboxVariant::Day => &self.skybox_day,
      SkyboxVariant::Night => &self.skybox_night,
    }
  }

  fn resolve_against(&mut self, dir: &Path)
  {
    let resolve = |p: &mut PathBuf| {
      if p.is_relative()
      {
        *p = dir.join(&*p);
      }
    };

    resolve(&mut self.map);
    resolve(&mut self.car);
    self.skybox_day.iter_mut().for_each(resolve);
    self.skybox_night.iter_mut().for_each(resolve);
  }
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn partial_json_fills_defaults()
  {
    let json = r#"{ "camera": { "speeds": { "movement": 25.0 } }, "window": { "width": 800 } }"#;
    let config: ViewerConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.camera.speeds.movement, 25.0);
    assert_eq!(config.camera.speeds.zoom, 10.0);
    assert_eq!(config.camera.sensitivity, 0.1);
    assert_eq!(config.window.width, 800);
    assert_eq!(config.window.height, 768);
    assert_eq!(config.shadow.map_size, 2048);
  }

  #[test]
  fn vectors_are_plain_arrays()
  {
    let json = r#"{ "camera": { "position": [1.0, 2.0, 3.0] } }"#;
    let config: ViewerConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.camera.position, Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(config.camera.target, Vec3::new(0.0, 0.0, -10.0));
  }

  #[test]
  fn default_round_trips_through_json()
  {
    let config = ViewerConfig::default();
    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: ViewerConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(config, parsed);
  }

  #[test]
  fn skybox_faces_follow_cube_order()
  {
    let assets = AssetConfig::default();

    let day = assets.skybox_faces(SkyboxVariant::Day);
    assert_eq!(day[0], PathBuf::from("skybox/right.tga"));
    assert_eq!(day[5], PathBuf::from("skybox/front.tga"));

    let night = assets.skybox_faces(SkyboxVariant::Night);
    assert_eq!(night[2], PathBuf::from("skybox/nightsky_up.tga"));
  }

  #[test]
  fn relative_assets_resolve_against_config_dir()
  {
    let mut assets = AssetConfig::default();
    assets.car = PathBuf::from("/abs/car.obj");

    assets.resolve_against(Path::new("scenes/demo"));

    assert_eq!(assets.map, PathBuf::from("scenes/demo/models/Map/NewMap.obj"));
    assert_eq!(assets.car, PathBuf::from("/abs/car.obj"));
    assert_eq!(assets.skybox_night[0], PathBuf::from("scenes/demo/skybox/nightsky_rt.tga"));
  }

  #[test]
  fn malformed_file_is_an_error()
  {
    let path = std::env::temp_dir().join("carview-malformed-config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = ViewerConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("parsing"));

    std::fs::remove_file(&path).ok();
  }

  #[test]
  fn missing_explicit_file_is_an_error()
  {
    let missing = OsString::from("definitely/not/here/carview.json");
    assert!(ViewerConfig::discover(Some(missing)).is_err());
  }
}
