use super::depth::{create_depth_view, DEPTH_FORMAT};
use super::model::{Model, ModelVertex};

//
// ──────────────────────────────────────────────────────────────
//   Shadow map
//
//   Depth-only pass from the directional light into a square
//   Depth32Float texture, then bound to the scene pass (group 3)
//   with a comparison sampler.
// ──────────────────────────────────────────────────────────────
//

pub struct ShadowMap
{
  view: wgpu::TextureView,
  pipeline: wgpu::RenderPipeline,

  pub sample_layout: wgpu::BindGroupLayout,
  pub sample_bind_group: wgpu::BindGroup,
}

impl ShadowMap
{
  pub fn create(
    device: &wgpu::Device,
    size: u32,
    frame_bgl: &wgpu::BindGroupLayout,
    object_bgl: &wgpu::BindGroupLayout,
  ) -> Self
  {
    let view = create_depth_view(
      device,
      "Shadow Map",
      size,
      size,
      wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
    );

    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
      label: Some("Shadow Sampler"),
      address_mode_u: wgpu::AddressMode::ClampToEdge,
      address_mode_v: wgpu::AddressMode::ClampToEdge,
      address_mode_w: wgpu::AddressMode::ClampToEdge,
      mag_filter: wgpu::FilterMode::Linear,
      min_filter: wgpu::FilterMode::Linear,
      mipmap_filter: wgpu::FilterMode::Nearest,
      compare: Some(wgpu::CompareFunction::LessEqual),
      ..Default::default()
    });

    let sample_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("Shadow BGL"),
      entries: &[
        wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Depth,
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 1,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
          count: None,
        },
      ],
    });

    let sample_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some("Shadow BG"),
      layout: &sample_layout,
      entries: &[
        wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&view) },
        wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&sampler) },
      ],
    });

    let pipeline = create_shadow_pipeline(device, frame_bgl, object_bgl);

    Self { view, pipeline, sample_layout, sample_bind_group }
  }

  /// Render `models` into the map. When disabled the map is only cleared,
  /// which the scene shader reads as fully lit.
  pub fn record(&self, encoder: &mut wgpu::CommandEncoder, frame_bg: &wgpu::BindGroup, models: &[&Model], enabled: bool)
  {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("Shadow Pass"),
      color_attachments: &[],
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: &self.view,
        depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
        stencil_ops: None,
      }),
      ..Default::default()
    });

    if !enabled
    {
      return;
    }

    pass.set_pipeline(&self.pipeline);
    pass.set_bind_group(0, frame_bg, &[]);

    for model in models
    {
      model.draw(&mut pass, false);
    }
  }
}

fn create_shadow_pipeline(
  device: &wgpu::Device,
  frame_bgl: &wgpu::BindGroupLayout,
  object_bgl: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline
{
  let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
    label: Some("Shadow Shader"),
    source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/shadow.wgsl").into()),
  });

  let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
    label: Some("Shadow Pipeline Layout"),
    bind_group_layouts: &[frame_bgl, object_bgl],
    push_constant_ranges: &[],
  });

  // Only the position attribute is read; the stride still spans the full vertex.
  let position_only = [wgpu::VertexAttribute { format: wgpu::VertexFormat::Float32x3, offset: 0, shader_location: 0 }];

  device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
    label: Some("Shadow Pipeline"),
    layout: Some(&layout),
    vertex: wgpu::VertexState {
      module: &shader,
      entry_point: Some("vs_main"),
      buffers: &[wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ModelVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &position_only,
      }],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    },
    fragment: None,
    primitive: wgpu::PrimitiveState {
      topology: wgpu::PrimitiveTopology::TriangleList,
      strip_index_format: None,
      front_face: wgpu::FrontFace::Ccw,
      cull_mode: None,
      unclipped_depth: false,
      polygon_mode: wgpu::PolygonMode::Fill,
      conservative: false,
    },
    depth_stencil: Some(wgpu::DepthStencilState {
      format: DEPTH_FORMAT,
      depth_write_enabled: true,
      depth_compare: wgpu::CompareFunction::Less,
      stencil: wgpu::StencilState::default(),
      bias: wgpu::DepthBiasState { constant: 2, slope_scale: 2.0, clamp: 0.0 },
    }),
    multisample: wgpu::MultisampleState::default(),
    multiview: None,
    cache: None,
  })
}
