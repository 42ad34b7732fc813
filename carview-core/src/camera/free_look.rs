use glam::{Mat4, Vec3};

//
// ──────────────────────────────────────────────────────────────
//   Camera (free-look, Y-up right-hand rule)
//
//   The camera stores an absolute eye point and an absolute
//   look-at point. `front` points from the target back towards
//   the eye, so moving "forward" subtracts it.
//
//     front = normalize(position - target)
//     right = normalize(up × front)
//
//   Yaw and pitch are kept in degrees. Rotation swings the
//   target around the eye; the eye never moves while looking.
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction
{
  Forward,
  Backward,
  Left,
  Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection
{
  In,
  Out,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera
{
  position: Vec3,
  target: Vec3,
  up: Vec3,
  front: Vec3,
  right: Vec3,

  yaw: f32,
  pitch: f32,
  fov: f32,
}

//
// ──────────────────────────────────────────────────────────────
//   Constants
// ──────────────────────────────────────────────────────────────
//

pub const PITCH_LIMIT: f32 = 89.0; // degrees, keeps the view off the poles
pub const FOV_MIN: f32 = 1.0;
pub const FOV_MAX: f32 = 45.0;

const DEFAULT_YAW: f32 = -90.0;
const DEFAULT_PITCH: f32 = 1.0;
const DEFAULT_FOV: f32 = 23.0;

// `set_pose` resets pitch to a different value than construction does.
// Both are kept as the viewer has always behaved.
const POSE_PITCH: f32 = 50.0;

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

impl Camera
{
  pub fn new(position: Vec3, target: Vec3, up: Vec3) -> Self
  {
    let front = front_from(position, target);
    let right = right_from(up, front);

    Self {
      position,
      target,
      up,
      front,
      right,
      yaw: DEFAULT_YAW,
      pitch: DEFAULT_PITCH,
      fov: DEFAULT_FOV,
    }
  }

  pub fn view_matrix(&self) -> Mat4
  {
    Mat4::look_at_rh(self.position, self.target, self.up)
  }

  /// Perspective projection for the current field of view.
  pub fn projection_matrix(&self, aspect: f32, znear: f32, zfar: f32) -> Mat4
  {
    Mat4::perspective_rh(self.fov.to_radians(), aspect, znear, zfar)
  }

  /// Slide eye and target together along `front` or `right`.
  /// `speed` is the distance covered by this one call.
  pub fn translate(&mut self, direction: Direction, speed: f32)
  {
    let offset = match direction
    {
      Direction::Forward => -self.front * speed,
      Direction::Backward => self.front * speed,
      Direction::Left => -self.right * speed,
      Direction::Right => self.right * speed,
    };

    self.position += offset;
    self.target += offset;
  }

  pub fn zoom(&mut self, direction: ZoomDirection, speed: f32)
  {
    match direction
    {
      ZoomDirection::In => self.fov = (self.fov - speed).max(FOV_MIN),
      ZoomDirection::Out => self.fov = (self.fov + speed).min(FOV_MAX),
    }
  }

  /// Free-look. Deltas are in degrees and already scaled by the caller.
  pub fn rotate(&mut self, pitch_delta: f32, yaw_delta: f32)
  {
    self.yaw += yaw_delta;
    self.pitch = (self.pitch + pitch_delta).clamp(-PITCH_LIMIT, PITCH_LIMIT);

    self.target = self.position + look_direction(self.yaw, self.pitch);
    self.front = front_from(self.position, self.target);
    self.right = right_from(self.up, self.front);
  }

  /// Overwrite eye and target outright, resetting yaw, pitch and fov.
  ///
  /// `front` and `right` are left as they were. They catch up on the next
  /// `rotate`, so a caller driving the camera through `set_pose` sees the
  /// basis of the last free-look orientation.
  pub fn set_pose(&mut self, position: Vec3, target: Vec3)
  {
    self.position = position;
    self.target = target;
    self.yaw = DEFAULT_YAW;
    self.pitch = POSE_PITCH;
    self.fov = DEFAULT_FOV;
  }

  pub fn position(&self) -> Vec3
  {
    self.position
  }

  pub fn target(&self) -> Vec3
  {
    self.target
  }

  pub fn up(&self) -> Vec3
  {
    self.up
  }

  pub fn front(&self) -> Vec3
  {
    self.front
  }

  pub fn right(&self) -> Vec3
  {
    self.right
  }

  pub fn yaw(&self) -> f32
  {
    self.yaw
  }

  pub fn pitch(&self) -> f32
  {
    self.pitch
  }

  pub fn fov(&self) -> f32
  {
    self.fov
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Basis helpers
// ──────────────────────────────────────────────────────────────
//

fn front_from(position: Vec3, target: Vec3) -> Vec3
{
  (position - target).normalize()
}

fn right_from(up: Vec3, front: Vec3) -> Vec3
{
  up.cross(front).normalize()
}

/// Unit view direction for yaw/pitch in degrees.
fn look_direction(yaw: f32, pitch: f32) -> Vec3
{
  let (sin_yaw, cos_yaw) = yaw.to_radians().sin_cos();
  let (sin_pitch, cos_pitch) = pitch.to_radians().sin_cos();

  Vec3::new(cos_yaw * cos_pitch, sin_pitch, sin_yaw * cos_pitch)
}

#[cfg(test)]
mod tests
{
  use super::*;

  const EPS: f32 = 1e-4;

  fn startup_camera() -> Camera
  {
    Camera::new(Vec3::new(0.0, 100.0, 3.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 50.0, 0.0))
  }

  #[test]
  fn construction_derives_unit_basis()
  {
    let cam = startup_camera();

    assert!((cam.front().length() - 1.0).abs() < EPS);
    assert!((cam.right().length() - 1.0).abs() < EPS);
    assert!(cam.front().dot(cam.right()).abs() < EPS);

    let expected = (cam.position() - cam.target()).normalize();
    assert!(cam.front().abs_diff_eq(expected, EPS));
  }

  #[test]
  fn construction_defaults()
  {
    let cam = startup_camera();

    assert_eq!(cam.yaw(), -90.0);
    assert_eq!(cam.pitch(), 1.0);
    assert_eq!(cam.fov(), 23.0);
    assert_eq!(cam.up(), Vec3::new(0.0, 50.0, 0.0));
  }

  #[test]
  fn forward_then_backward_returns_home()
  {
    let mut cam = startup_camera();
    let (pos, tgt) = (cam.position(), cam.target());

    cam.translate(Direction::Forward, 10.0);
    assert!(!cam.position().abs_diff_eq(pos, EPS));

    cam.translate(Direction::Backward, 10.0);
    assert!(cam.position().abs_diff_eq(pos, EPS));
    assert!(cam.target().abs_diff_eq(tgt, EPS));
  }

  #[test]
  fn forward_moves_towards_target()
  {
    let mut cam = startup_camera();
    let before = cam.position().distance(Vec3::new(0.0, 0.0, -10.0));

    cam.translate(Direction::Forward, 10.0);

    // Eye and target move together, so measure against the old target.
    let after = cam.position().distance(Vec3::new(0.0, 0.0, -10.0));
    assert!((before - after - 10.0).abs() < 1e-3);
  }

  #[test]
  fn strafing_keeps_look_direction()
  {
    let mut cam = startup_camera();
    let look = cam.target() - cam.position();

    cam.translate(Direction::Left, 7.5);
    assert!((cam.target() - cam.position()).abs_diff_eq(look, EPS));

    cam.translate(Direction::Right, 7.5);
    assert!(cam.position().abs_diff_eq(Vec3::new(0.0, 100.0, 3.0), EPS));
  }

  #[test]
  fn zoom_clamps_to_limits()
  {
    let mut cam = startup_camera();

    cam.zoom(ZoomDirection::In, 1000.0);
    assert_eq!(cam.fov(), 1.0);

    cam.zoom(ZoomDirection::Out, 1000.0);
    assert_eq!(cam.fov(), 45.0);
  }

  #[test]
  fn zoom_steps_within_range()
  {
    let mut cam = startup_camera();

    cam.zoom(ZoomDirection::In, 10.0);
    assert_eq!(cam.fov(), 13.0);

    cam.zoom(ZoomDirection::Out, 10.0);
    assert_eq!(cam.fov(), 23.0);
  }

  #[test]
  fn rotate_clamps_pitch()
  {
    let mut cam = startup_camera();

    cam.rotate(500.0, 0.0);
    assert_eq!(cam.pitch(), 89.0);

    cam.rotate(-10_000.0, 0.0);
    assert_eq!(cam.pitch(), -89.0);
  }

  #[test]
  fn rotate_swings_target_around_fixed_eye()
  {
    let mut cam = startup_camera();
    let eye = cam.position();

    cam.rotate(3.0, 45.0);

    assert_eq!(cam.position(), eye);
    assert!((cam.target().distance(eye) - 1.0).abs() < EPS);
    assert!((cam.front().length() - 1.0).abs() < EPS);
    assert!((cam.right().length() - 1.0).abs() < EPS);
    assert!(cam.front().abs_diff_eq((eye - cam.target()).normalize(), EPS));
  }

  #[test]
  fn rotate_with_default_angles_looks_down_negative_z()
  {
    let mut cam = startup_camera();

    // yaw -90, pitch 1 → almost straight along -Z
    cam.rotate(-1.0, 0.0);

    let dir = cam.target() - cam.position();
    assert!(dir.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), EPS));
  }

  #[test]
  fn yaw_is_unbounded()
  {
    let mut cam = startup_camera();

    cam.rotate(0.0, 720.0);
    assert_eq!(cam.yaw(), 630.0);
  }

  #[test]
  fn set_pose_resets_angles_but_not_basis()
  {
    let mut cam = startup_camera();
    cam.zoom(ZoomDirection::In, 5.0);
    let front = cam.front();

    cam.set_pose(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));

    assert_eq!(cam.position(), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(cam.target(), Vec3::new(4.0, 5.0, 6.0));
    assert_eq!(cam.yaw(), -90.0);
    assert_eq!(cam.pitch(), 50.0);
    assert_eq!(cam.fov(), 23.0);
    assert_eq!(cam.front(), front);
  }

  #[test]
  fn view_matrix_is_pure()
  {
    let cam = startup_camera();

    assert_eq!(cam.view_matrix(), cam.view_matrix());
    assert_eq!(
      cam.view_matrix(),
      Mat4::look_at_rh(cam.position(), cam.target(), cam.up())
    );
  }

  #[test]
  fn view_matrix_maps_eye_to_origin()
  {
    let cam = startup_camera();
    let eye_in_view = cam.view_matrix().transform_point3(cam.position());

    assert!(eye_in_view.abs_diff_eq(Vec3::ZERO, 1e-3));
  }
}
