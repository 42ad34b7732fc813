use carview_core::lighting::normal_matrix;
use carview_core::{RenderContext, ShadowVolume};
use glam::{Mat3, Mat4, Vec3};

use crate::config::ProjectionConfig;

//
// ──────────────────────────────────────────────────────────────
//   Frame Uniform (GPU side)
//
//   WGSL layout (scene.wgsl, shadow.wgsl):
//     view         : mat4x4<f32>   →  64 bytes
//     projection   : mat4x4<f32>   →  64 bytes
//     light_space  : mat4x4<f32>   →  64 bytes
//     light_dir    : vec4<f32>     →  16 bytes  (towards the light, world)
//     light_color  : vec4<f32>     →  16 bytes
//     eye_position : vec4<f32>     →  16 bytes  (point light origin, world)
//     eye_front    : vec4<f32>     →  16 bytes  (camera front, world)
//     flags        : vec4<f32>     →  16 bytes  (fog, point light, shadows, -)
//   Total: 272 bytes
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform
{
  pub view: [[f32; 4]; 4],
  pub projection: [[f32; 4]; 4],
  pub light_space: [[f32; 4]; 4],
  pub light_dir: [f32; 4],
  pub light_color: [f32; 4],
  pub eye_position: [f32; 4],
  pub eye_front: [f32; 4],
  pub flags: [f32; 4],
}

// Catch CPU/GPU layout mismatches at compile time
const _: () = assert!(std::mem::size_of::<FrameUniform>() == 272);

impl FrameUniform
{
  pub fn from_context(
    ctx: &RenderContext,
    aspect: f32,
    projection: &ProjectionConfig,
    volume: &ShadowVolume,
  ) -> Self
  {
    let camera = &ctx.camera;
    let light = ctx.light();
    let settings = &ctx.settings;

    let view = camera.view_matrix();
    let proj = camera.projection_matrix(aspect, projection.znear, projection.zfar);

    Self {
      view: view.to_cols_array_2d(),
      projection: proj.to_cols_array_2d(),
      light_space: light.space_matrix(volume).to_cols_array_2d(),
      light_dir: light.direction.extend(0.0).to_array(),
      light_color: light.color.extend(1.0).to_array(),
      eye_position: camera.position().extend(1.0).to_array(),
      eye_front: camera.front().extend(0.0).to_array(),
      flags: [flag(settings.fog), flag(settings.point_light), flag(settings.shadows), 0.0],
    }
  }
}

fn flag(on: bool) -> f32
{
  if on
  {
    1.0
  }
  else
  {
    0.0
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Object Uniform (one per drawn model)
//
//     model  : mat4x4<f32>  → 64 bytes
//     normal : mat4x4<f32>  → 64 bytes  (view-space normal matrix, padded)
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform
{
  pub model: [[f32; 4]; 4],
  pub normal: [[f32; 4]; 4],
}

const _: () = assert!(std::mem::size_of::<ObjectUniform>() == 128);

impl ObjectUniform
{
  pub fn new(model: Mat4, view: Mat4) -> Self
  {
    let normal = Mat4::from_mat3(normal_matrix(view, model));
    Self { model: model.to_cols_array_2d(), normal: normal.to_cols_array_2d() }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Skybox Uniform
//
//     view_proj : mat4x4<f32>  → 64 bytes  (view without translation)
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SkyUniform
{
  pub view_proj: [[f32; 4]; 4],
}

const _: () = assert!(std::mem::size_of::<SkyUniform>() == 64);

impl SkyUniform
{
  pub fn new(view: Mat4, aspect: f32, projection: &ProjectionConfig) -> Self
  {
    let proj = Mat4::perspective_rh(projection.skybox_fov.to_radians(), aspect, projection.znear, projection.skybox_zfar);
    Self { view_proj: sky_view_proj(view, proj).to_cols_array_2d() }
  }
}

/// Drop the translation so the sky stays at infinity.
fn sky_view_proj(view: Mat4, proj: Mat4) -> Mat4
{
  proj * Mat4::from_mat3(Mat3::from_mat4(view))
}

#[cfg(test)]
mod tests
{
  use super::*;
  use carview_core::{Action, Camera, Speeds};

  fn context() -> RenderContext
  {
    let camera = Camera::new(Vec3::new(0.0, 100.0, 3.0), Vec3::new(0.0, 0.0, -10.0), Vec3::new(0.0, 50.0, 0.0));
    RenderContext::new(camera, Speeds::default())
  }

  #[test]
  fn flags_follow_settings()
  {
    let mut ctx = context();
    let projection = ProjectionConfig::default();
    let volume = ShadowVolume::default();

    let on = FrameUniform::from_context(&ctx, 1.0, &projection, &volume);
    assert_eq!(on.flags, [1.0, 1.0, 1.0, 0.0]);

    ctx.apply(Action::SetFog(false));
    ctx.apply(Action::SetShadows(false));
    let off = FrameUniform::from_context(&ctx, 1.0, &projection, &volume);
    assert_eq!(off.flags, [0.0, 1.0, 0.0, 0.0]);
  }

  #[test]
  fn frame_carries_camera_eye_and_front()
  {
    let ctx = context();
    let u = FrameUniform::from_context(&ctx, 4.0 / 3.0, &ProjectionConfig::default(), &ShadowVolume::default());

    assert_eq!(u.eye_position, [0.0, 100.0, 3.0, 1.0]);
    assert_eq!(u.eye_front[3], 0.0);
    assert_eq!(u.view, ctx.camera.view_matrix().to_cols_array_2d());
  }

  #[test]
  fn sky_ignores_camera_translation()
  {
    let proj = Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0);
    let near = Mat4::look_at_rh(Vec3::ZERO, Vec3::NEG_Z, Vec3::Y);
    let far = Mat4::look_at_rh(Vec3::new(500.0, -20.0, 9.0), Vec3::new(500.0, -20.0, 8.0), Vec3::Y);

    assert!(sky_view_proj(near, proj).abs_diff_eq(sky_view_proj(far, proj), 1e-5));
  }

  #[test]
  fn object_normal_matrix_is_padded()
  {
    let u = ObjectUniform::new(Mat4::IDENTITY, Mat4::IDENTITY);

    assert_eq!(u.normal, Mat4::IDENTITY.to_cols_array_2d());
    assert_eq!(u.model, Mat4::IDENTITY.to_cols_array_2d());
  }
}
