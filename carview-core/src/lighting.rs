use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

//
// ──────────────────────────────────────────────────────────────
//   Directional light + shadow volume
// ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light
{
  /// Direction towards the light, not normalised.
  pub direction: Vec3,
  pub color: Vec3,
}

pub const LIGHT_DIRECTION: Vec3 = Vec3::new(-0.2, 4.0, -0.3);
pub const DAY_LIGHT_COLOR: Vec3 = Vec3::splat(0.5);
pub const NIGHT_LIGHT_COLOR: Vec3 = Vec3::splat(0.05);

impl Default for Light
{
  fn default() -> Self
  {
    Self { direction: LIGHT_DIRECTION, color: DAY_LIGHT_COLOR }
  }
}

/// Orthographic box the shadow map covers, centred on the world origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowVolume
{
  /// Half-width and half-height of the box.
  pub extent: f32,
  /// How far from the origin the light eye sits along the light direction.
  pub distance: f32,
  pub znear: f32,
  pub zfar: f32,
}

impl Default for ShadowVolume
{
  fn default() -> Self
  {
    Self { extent: 3000.0, distance: 3000.0, znear: 1.0, zfar: 8000.0 }
  }
}

impl Light
{
  /// World → light clip space, for rendering and sampling the shadow map.
  pub fn space_matrix(&self, volume: &ShadowVolume) -> Mat4
  {
    let eye = self.direction.normalize() * volume.distance;
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y);

    let e = volume.extent;
    let proj = Mat4::orthographic_rh(-e, e, -e, e, volume.znear, volume.zfar);

    proj * view
  }
}

/// Inverse-transpose of the upper 3×3 of `view * model`, for view-space normals.
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3
{
  Mat3::from_mat4((view * model).inverse().transpose())
}

#[cfg(test)]
mod tests
{
  use super::*;

  #[test]
  fn origin_lands_mid_depth_in_light_space()
  {
    let light = Light::default();
    let volume = ShadowVolume::default();

    let clip = light.space_matrix(&volume).project_point3(Vec3::ZERO);

    assert!(clip.x.abs() < 1e-4);
    assert!(clip.y.abs() < 1e-4);
    // wgpu depth range is 0..1
    let expected = (volume.distance - volume.znear) / (volume.zfar - volume.znear);
    assert!((clip.z - expected).abs() < 1e-3);
  }

  #[test]
  fn volume_edges_map_to_clip_edges()
  {
    let light = Light { direction: Vec3::new(0.0, 1.0, 1.0), color: DAY_LIGHT_COLOR };
    let volume = ShadowVolume { extent: 100.0, distance: 50.0, znear: 1.0, zfar: 200.0 };
    let m = light.space_matrix(&volume);

    let corner = m.project_point3(Vec3::new(100.0, 0.0, 0.0));
    assert!((corner.x - 1.0).abs() < 1e-3);
  }

  #[test]
  fn normal_matrix_of_rigid_transform_is_rotation()
  {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
    let model = Mat4::from_rotation_y(0.7);

    let n = normal_matrix(view, model);
    let expected = Mat3::from_mat4(view * model);

    assert!(n.abs_diff_eq(expected, 1e-4));
  }

  #[test]
  fn normal_matrix_corrects_non_uniform_scale()
  {
    let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
    let n = normal_matrix(Mat4::IDENTITY, model);

    // A 45° surface normal must tilt towards the unscaled axis.
    let normal = n * Vec3::new(1.0, 1.0, 0.0).normalize();
    assert!(normal.y > normal.x);
  }
}
