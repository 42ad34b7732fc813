use carview_core::SkyboxVariant;
use glam::Mat4;
use log::{info, warn};
use wgpu::util::DeviceExt;

use super::depth::DEPTH_FORMAT;
use super::texture;
use super::uniforms::SkyUniform;
use crate::config::{AssetConfig, ProjectionConfig};

//
// ──────────────────────────────────────────────────────────────
//   Unit cube, drawn from the inside (36 verts, no index buffer)
// ──────────────────────────────────────────────────────────────
//

#[rustfmt::skip]
const CUBE_VERTICES: [[f32; 3]; 36] = [
  [-1.0,  1.0, -1.0], [-1.0, -1.0, -1.0], [ 1.0, -1.0, -1.0],
  [ 1.0, -1.0, -1.0], [ 1.0,  1.0, -1.0], [-1.0,  1.0, -1.0],

  [-1.0, -1.0,  1.0], [-1.0, -1.0, -1.0], [-1.0,  1.0, -1.0],
  [-1.0,  1.0, -1.0], [-1.0,  1.0,  1.0], [-1.0, -1.0,  1.0],

  [ 1.0, -1.0, -1.0], [ 1.0, -1.0,  1.0], [ 1.0,  1.0,  1.0],
  [ 1.0,  1.0,  1.0], [ 1.0,  1.0, -1.0], [ 1.0, -1.0, -1.0],

  [-1.0, -1.0,  1.0], [-1.0,  1.0,  1.0], [ 1.0,  1.0,  1.0],
  [ 1.0,  1.0,  1.0], [ 1.0, -1.0,  1.0], [-1.0, -1.0,  1.0],

  [-1.0,  1.0, -1.0], [ 1.0,  1.0, -1.0], [ 1.0,  1.0,  1.0],
  [ 1.0,  1.0,  1.0], [-1.0,  1.0,  1.0], [-1.0,  1.0, -1.0],

  [-1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0, -1.0],
  [ 1.0, -1.0, -1.0], [-1.0, -1.0,  1.0], [ 1.0, -1.0,  1.0],
];

pub struct Skybox
{
  vertex_buffer: wgpu::Buffer,
  uniform_buffer: wgpu::Buffer,
  layout: wgpu::BindGroupLayout,
  sampler: wgpu::Sampler,
  bind_group: wgpu::BindGroup,
  pipeline: wgpu::RenderPipeline,

  /// Variant whose faces are currently bound.
  loaded: SkyboxVariant,
  /// Variant last asked for, loaded or not. Stops a broken set of faces
  /// from being retried every frame.
  requested: SkyboxVariant,
}

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

impl Skybox
{
  pub fn create(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    color_format: wgpu::TextureFormat,
    assets: &AssetConfig,
    variant: SkyboxVariant,
  ) -> anyhow::Result<Self>
  {
    let faces = load_faces(assets, variant)?;
    let cube_view = texture::create_cube(device, queue, "Skybox Cube", &faces)?;

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Skybox Vertices"),
      contents: bytemuck::cast_slice(&CUBE_VERTICES),
      usage: wgpu::BufferUsages::VERTEX,
    });

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
      label: Some("Skybox Uniform Buffer"),
      size: std::mem::size_of::<SkyUniform>() as u64,
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
      mapped_at_creation: false,
    });

    let layout = create_layout(device);
    let sampler = texture::linear_sampler(device, "Skybox Sampler", wgpu::AddressMode::ClampToEdge);
    let bind_group = create_bind_group(device, &layout, &uniform_buffer, &cube_view, &sampler);
    let pipeline = create_pipeline(device, color_format, &layout);

    Ok(Self {
      vertex_buffer,
      uniform_buffer,
      layout,
      sampler,
      bind_group,
      pipeline,
      loaded: variant,
      requested: variant,
    })
  }

  /// Swap the cube map when the requested variant changes. A failed load
  /// is logged and the current sky stays up.
  pub fn reload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, assets: &AssetConfig, variant: SkyboxVariant)
  {
    if variant == self.requested
    {
      return;
    }

    self.requested = variant;

    let cube_view = load_faces(assets, variant)
      .and_then(|faces| texture::create_cube(device, queue, "Skybox Cube", &faces));

    match cube_view
    {
      Ok(view) =>
      {
        self.bind_group = create_bind_group(device, &self.layout, &self.uniform_buffer, &view, &self.sampler);
        self.loaded = variant;
        info!("skybox switched to {variant:?}");
      }
      Err(err) =>
      {
        warn!("keeping {:?} skybox: {err:#}", self.loaded);
      }
    }
  }

  pub fn update(&self, queue: &wgpu::Queue, view: Mat4, aspect: f32, projection: &ProjectionConfig)
  {
    let uniform = SkyUniform::new(view, aspect, projection);
    queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniform));
  }

  pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>)
  {
    pass.set_pipeline(&self.pipeline);
    pass.set_bind_group(0, &self.bind_group, &[]);
    pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
    pass.draw(0..CUBE_VERTICES.len() as u32, 0..1);
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Helpers
// ──────────────────────────────────────────────────────────────
//

fn load_faces(assets: &AssetConfig, variant: SkyboxVariant) -> anyhow::Result<[image::RgbaImage; 6]>
{
  let [px, nx, py, ny, pz, nz] = assets.skybox_faces(variant);

  Ok([
    texture::load_rgba(px)?,
    texture::load_rgba(nx)?,
    texture::load_rgba(py)?,
    texture::load_rgba(ny)?,
    texture::load_rgba(pz)?,
    texture::load_rgba(nz)?,
  ])
}

fn create_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout
{
  device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Skybox BGL"),
    entries: &[
      wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX,
        ty: wgpu::BindingType::Buffer {
          ty: wgpu::BufferBindingType::Uniform,
          has_dynamic_offset: false,
          min_binding_size: None,
        },
        count: None,
      },
      wgpu::BindGroupLayoutEntry {
        binding: 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
          sample_type: wgpu::TextureSampleType::Float { filterable: true },
          view_dimension: wgpu::TextureViewDimension::Cube,
          multisampled: false,
        },
        count: None,
      },
      wgpu::BindGroupLayoutEntry {
        binding: 2,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
      },
    ],
  })
}

fn create_bind_group(
  device: &wgpu::Device,
  layout: &wgpu::BindGroupLayout,
  uniform_buffer: &wgpu::Buffer,
  cube_view: &wgpu::TextureView,
  sampler: &wgpu::Sampler,
) -> wgpu::BindGroup
{
  device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some("Skybox BG"),
    layout,
    entries: &[
      wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() },
      wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::TextureView(cube_view) },
      wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::Sampler(sampler) },
    ],
  })
}

fn create_pipeline(
  device: &wgpu::Device,
  color_format: wgpu::TextureFormat,
  layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline
{
  let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
    label: Some("Skybox Shader"),
    source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/skybox.wgsl").into()),
  });

  let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
    label: Some("Skybox Pipeline Layout"),
    bind_group_layouts: &[layout],
    push_constant_ranges: &[],
  });

  device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
    label: Some("Skybox Pipeline"),
    layout: Some(&pipeline_layout),
    vertex: wgpu::VertexState {
      module: &shader,
      entry_point: Some("vs_main"),
      buffers: &[wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 3]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
      }],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    },
    fragment: Some(wgpu::FragmentState {
      module: &shader,
      entry_point: Some("fs_main"),
      targets: &[Some(wgpu::ColorTargetState {
        format: color_format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
      })],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    }),
    primitive: wgpu::PrimitiveState {
      topology: wgpu::PrimitiveTopology::TriangleList,
      cull_mode: None, // seen from inside
      ..Default::default()
    },
    // Depth is forced to 1.0 in the shader; draw only where nothing else landed.
    depth_stencil: Some(wgpu::DepthStencilState {
      format: DEPTH_FORMAT,
      depth_write_enabled: false,
      depth_compare: wgpu::CompareFunction::LessEqual,
      stencil: wgpu::StencilState::default(),
      bias: wgpu::DepthBiasState::default(),
    }),
    multisample: wgpu::MultisampleState::default(),
    multiview: None,
    cache: None,
  })
}
