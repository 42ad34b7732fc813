use glam::{Mat4, Vec3};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Direction, Flythrough, Phase, ZoomDirection};
use crate::car::CarPatrol;
use crate::lighting::{Light, DAY_LIGHT_COLOR, LIGHT_DIRECTION, NIGHT_LIGHT_COLOR};

//
// ──────────────────────────────────────────────────────────────
//   Scene settings (toggled from the keyboard or the HUD)
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyboxVariant
{
  Day,
  Night,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode
{
  Fill,
  Wireframe,
  Points,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings
{
  pub fog: bool,
  pub point_light: bool,
  pub shadows: bool,
  pub skybox: SkyboxVariant,
  pub render_mode: RenderMode,
  /// Spin of the whole scene about +Y, degrees.
  pub model_angle: f32,
}

impl Default for SceneSettings
{
  fn default() -> Self
  {
    Self {
      fog: true,
      point_light: true,
      shadows: true,
      skybox: SkyboxVariant::Day,
      render_mode: RenderMode::Fill,
      model_angle: 0.0,
    }
  }
}

/// Distances applied per frame while a key is held.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Speeds
{
  pub movement: f32,
  pub zoom: f32,
}

impl Default for Speeds
{
  fn default() -> Self
  {
    Self { movement: 10.0, zoom: 10.0 }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Actions
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action
{
  Move(Direction),
  Zoom(ZoomDirection),
  /// Degrees, already scaled by mouse sensitivity.
  Look { pitch: f32, yaw: f32 },
  /// Degrees about +Y.
  SpinModel(f32),
  SetRenderMode(RenderMode),
  SetSkybox(SkyboxVariant),
  SetFog(bool),
  SetPointLight(bool),
  SetShadows(bool),
  StartFlythrough,
  CancelFlythrough,
}

impl Action
{
  /// Actions that still reach the scene while the flythrough owns the camera.
  fn allowed_during_flythrough(&self) -> bool
  {
    matches!(self, Action::StartFlythrough | Action::CancelFlythrough)
  }
}

//
// ──────────────────────────────────────────────────────────────
//   RenderContext
//
//   Everything the render loop mutates between frames. The
//   renderer only reads from it.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
pub struct RenderContext
{
  pub camera: Camera,
  pub flythrough: Flythrough,
  pub car: CarPatrol,
  pub settings: SceneSettings,
  pub speeds: Speeds,
}

impl RenderContext
{
  pub fn new(camera: Camera, speeds: Speeds) -> Self
  {
    Self {
      camera,
      flythrough: Flythrough::tour(),
      car: CarPatrol::new(),
      settings: SceneSettings::default(),
      speeds,
    }
  }

  /// Apply one input action. Returns false when it was ignored.
  pub fn apply(&mut self, action: Action) -> bool
  {
    if self.flythrough.is_active() && !action.allowed_during_flythrough()
    {
      return false;
    }

    match action
    {
      Action::Move(direction) => self.camera.translate(direction, self.speeds.movement),
      Action::Zoom(direction) => self.camera.zoom(direction, self.speeds.zoom),
      Action::Look { pitch, yaw } => self.camera.rotate(pitch, yaw),
      Action::SpinModel(degrees) => self.settings.model_angle += degrees,
      Action::SetRenderMode(mode) => self.settings.render_mode = mode,
      Action::SetSkybox(variant) => self.settings.skybox = variant,
      Action::SetFog(on) => self.settings.fog = on,
      Action::SetPointLight(on) => self.settings.point_light = on,
      Action::SetShadows(on) => self.settings.shadows = on,
      Action::StartFlythrough => self.flythrough.start(),
      Action::CancelFlythrough => self.flythrough.reset(),
    }

    if !matches!(action, Action::Move(_) | Action::Zoom(_) | Action::Look { .. } | Action::SpinModel(_))
    {
      debug!("applied {action:?}");
    }

    true
  }

  /// Per-frame update: drive the car and the flythrough.
  pub fn frame(&mut self)
  {
    self.car.advance();

    if self.flythrough.step(&mut self.camera) == Phase::Done
    {
      info!("flythrough finished");
      self.flythrough.reset();
    }
  }

  pub fn is_animating(&self) -> bool
  {
    self.flythrough.is_active()
  }

  /// Scene transform shared by the map and, as a base, the car.
  pub fn model_matrix(&self) -> Mat4
  {
    Mat4::from_rotation_y(self.settings.model_angle.to_radians())
  }

  pub fn car_matrix(&self) -> Mat4
  {
    self.car.model_matrix(self.model_matrix())
  }

  pub fn light(&self) -> Light
  {
    Light { direction: LIGHT_DIRECTION, color: self.light_color() }
  }

  fn light_color(&self) -> Vec3
  {
    match self.settings.skybox
    {
      SkyboxVariant::Day => DAY_LIGHT_COLOR,
      SkyboxVariant::Night => NIGHT_LIGHT_COLOR,
    }
  }
}
