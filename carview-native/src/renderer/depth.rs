use wgpu::*;

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Screen depth buffer. Recreated on every resize.
pub struct DepthResources
{
  pub view: TextureView,
}

impl DepthResources
{
  pub fn create(device: &Device, width: u32, height: u32) -> Self
  {
    let view = create_depth_view(device, "Depth Texture", width, height, TextureUsages::RENDER_ATTACHMENT);
    Self { view }
  }
}

/// Single-layer Depth32Float target. Add `TEXTURE_BINDING` to sample it afterwards.
pub fn create_depth_view(device: &Device, label: &str, width: u32, height: u32, usage: TextureUsages)
  -> TextureView
{
  let texture = device.create_texture(&TextureDescriptor {
    label: Some(label),
    size: Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
    mip_level_count: 1,
    sample_count: 1,
    dimension: TextureDimension::D2,
    format: DEPTH_FORMAT,
    usage,
    view_formats: &[],
  });

  texture.create_view(&TextureViewDescriptor::default())
}
