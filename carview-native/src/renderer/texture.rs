use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

//
// ──────────────────────────────────────────────────────────────
//   GPU textures (model diffuse maps, skybox cube)
// ──────────────────────────────────────────────────────────────
//

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

pub fn load_rgba(path: &Path) -> anyhow::Result<RgbaImage>
{
  let img = image::open(path).with_context(|| format!("loading texture {}", path.display()))?;
  Ok(img.to_rgba8())
}

pub fn create_2d(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, img: &RgbaImage) -> wgpu::TextureView
{
  let (width, height) = img.dimensions();

  let texture = device.create_texture(&wgpu::TextureDescriptor {
    label: Some(label),
    size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
    mip_level_count: 1,
    sample_count: 1,
    dimension: wgpu::TextureDimension::D2,
    format: COLOR_FORMAT,
    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    view_formats: &[],
  });

  write_layer(queue, &texture, 0, img);

  texture.create_view(&wgpu::TextureViewDescriptor::default())
}

/// 1×1 texture, used when a material has a colour but no image.
pub fn solid_color(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, rgb: [f32; 3]) -> wgpu::TextureView
{
  let img = RgbaImage::from_pixel(1, 1, image::Rgba(color_to_rgba8(rgb)));
  create_2d(device, queue, label, &img)
}

/// Six faces, +X −X +Y −Y +Z −Z.
pub fn create_cube(
  device: &wgpu::Device,
  queue: &wgpu::Queue,
  label: &str,
  faces: &[RgbaImage; 6],
) -> anyhow::Result<wgpu::TextureView>
{
  let sizes = faces.each_ref().map(|f| f.dimensions());
  let size = check_cube_faces(&sizes)?;

  let texture = device.create_texture(&wgpu::TextureDescriptor {
    label: Some(label),
    size: wgpu::Extent3d { width: size, height: size, depth_or_array_layers: 6 },
    mip_level_count: 1,
    sample_count: 1,
    dimension: wgpu::TextureDimension::D2,
    format: COLOR_FORMAT,
    usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
    view_formats: &[],
  });

  for (layer, face) in faces.iter().enumerate()
  {
    write_layer(queue, &texture, layer as u32, face);
  }

  let view = texture.create_view(&wgpu::TextureViewDescriptor {
    label: Some(label),
    dimension: Some(wgpu::TextureViewDimension::Cube),
    ..Default::default()
  });

  Ok(view)
}

pub fn linear_sampler(device: &wgpu::Device, label: &str, address_mode: wgpu::AddressMode) -> wgpu::Sampler
{
  device.create_sampler(&wgpu::SamplerDescriptor {
    label: Some(label),
    address_mode_u: address_mode,
    address_mode_v: address_mode,
    address_mode_w: address_mode,
    mag_filter: wgpu::FilterMode::Linear,
    min_filter: wgpu::FilterMode::Linear,
    mipmap_filter: wgpu::FilterMode::Nearest,
    ..Default::default()
  })
}

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, img: &RgbaImage)
{
  let (width, height) = img.dimensions();

  queue.write_texture(
    wgpu::TexelCopyTextureInfo {
      texture,
      mip_level: 0,
      origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
      aspect: wgpu::TextureAspect::All,
    },
    img.as_raw(),
    wgpu::TexelCopyBufferLayout { offset: 0, bytes_per_row: Some(4 * width), rows_per_image: Some(height) },
    wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
  );
}

/// Cube faces must all be the same non-empty square. Returns the edge length.
fn check_cube_faces(sizes: &[(u32, u32); 6]) -> anyhow::Result<u32>
{
  let (width, height) = sizes[0];

  if width == 0 || width != height
  {
    anyhow::bail!("skybox face 0 is {width}x{height}, expected a non-empty square");
  }

  if let Some(face) = sizes.iter().position(|&s| s != (width, height))
  {
    let (w, h) = sizes[face];
    anyhow::bail!("skybox face {face} is {w}x{h}, expected {width}x{height}");
  }

  Ok(width)
}

fn color_to_rgba8(rgb: [f32; 3]) -> [u8; 4]
{
  let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
  [channel(rgb[0]), channel(rgb[1]), channel(rgb[2]), 255]
}
