use std::sync::Arc;

use anyhow::Context;
use carview_core::{RenderContext, RenderMode, ShadowVolume, SkyboxVariant};
use log::{info, warn};
use winit::window::Window;

use crate::config::{AssetConfig, ProjectionConfig, ViewerConfig};

use super::depth::{DepthResources, DEPTH_FORMAT};
use super::gui::GuiRenderer;
use super::model::{load_obj, Model, ModelLayouts, ModelVertex};
use super::shadow::ShadowMap;
use super::skybox::Skybox;
use super::uniforms::FrameUniform;

const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.7, g: 0.7, b: 0.7, a: 1.0 };

pub struct Renderer
{
  surface: wgpu::Surface<'static>,
  device: wgpu::Device,
  queue: wgpu::Queue,
  config: wgpu::SurfaceConfiguration,

  depth: DepthResources,
  frame_buffer: wgpu::Buffer,
  frame_bind_group: wgpu::BindGroup,

  pipelines: ScenePipelines,
  shadow: ShadowMap,
  skybox: Skybox,
  map: Model,
  car: Model,

  pub gui: GuiRenderer,

  projection: ProjectionConfig,
  shadow_volume: ShadowVolume,
  assets: AssetConfig,
}

//
// ──────────────────────────────────────────────────────────────
//   Public API
// ──────────────────────────────────────────────────────────────
//

impl Renderer
{
  pub async fn new(window: Arc<Window>, ctx: &RenderContext, viewer: &ViewerConfig) -> anyhow::Result<Self>
  {
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window.clone()).context("creating window surface")?;

    let adapter = request_adapter(&instance, &surface).await?;
    let (device, queue) = request_device(&adapter).await?;

    let config = configure_surface(&window, &surface, &adapter, &device)?;
    let depth = DepthResources::create(&device, config.width, config.height);

    let (frame_buffer, frame_bind_group, frame_bgl) = create_frame_resources(&device);
    let layouts = ModelLayouts::create(&device);

    let shadow = ShadowMap::create(&device, viewer.shadow.map_size, &frame_bgl, &layouts.object);
    let pipelines = ScenePipelines::create(&device, config.format, &[
      &frame_bgl,
      &layouts.object,
      &layouts.material,
      &shadow.sample_layout,
    ]);

    let assets = &viewer.assets;
    let map = Model::upload(&device, &queue, "Map", &load_obj(&assets.map)?, &layouts);
    let car = Model::upload(&device, &queue, "Car", &load_obj(&assets.car)?, &layouts);

    let skybox = Skybox::create(&device, &queue, config.format, assets, ctx.settings.skybox)
      .context("loading skybox")?;

    let gui = GuiRenderer::new(&device, config.format, &window);

    Ok(Self {
      surface,
      device,
      queue,
      config,
      depth,
      frame_buffer,
      frame_bind_group,
      pipelines,
      shadow,
      skybox,
      map,
      car,
      gui,
      projection: viewer.projection.clone(),
      shadow_volume: viewer.shadow.volume,
      assets: viewer.assets.clone(),
    })
  }

  pub fn resize(&mut self, width: u32, height: u32)
  {
    self.config.width = width.max(1);
    self.config.height = height.max(1);
    self.surface.configure(&self.device, &self.config);
    self.depth = DepthResources::create(&self.device, self.config.width, self.config.height);
  }

  pub fn aspect(&self) -> f32
  {
    self.config.width as f32 / self.config.height as f32
  }

  /// Record and present one frame: shadow map, lit scene, skybox, HUD.
  pub fn render(&mut self, ctx: &RenderContext, window: &Window, gui_output: egui::FullOutput) -> anyhow::Result<()>
  {
    self.sync_skybox(ctx.settings.skybox);
    self.upload_uniforms(ctx);

    let frame = match self.surface.get_current_texture()
    {
      Ok(frame) => frame,
      Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) =>
      {
        // Skip this frame; the next one renders into the rebuilt swapchain.
        self.surface.configure(&self.device, &self.config);
        return Ok(());
      }
      Err(wgpu::SurfaceError::Timeout) =>
      {
        warn!("surface timed out, dropping frame");
        return Ok(());
      }
      Err(err) => return Err(err).context("acquiring next frame"),
    };

    let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder =
      self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") });

    self.shadow.record(&mut encoder, &self.frame_bind_group, &[&self.map, &self.car], ctx.settings.shadows);
    self.record_scene_pass(&mut encoder, &view, ctx.settings.render_mode);
    self.gui.render(&self.device, &self.queue, &mut encoder, window, &view, gui_output);

    self.queue.submit(Some(encoder.finish()));
    frame.present();

    Ok(())
  }

  /// Reload the cube map if the requested day/night variant changed.
  pub fn sync_skybox(&mut self, variant: SkyboxVariant)
  {
    self.skybox.reload(&self.device, &self.queue, &self.assets, variant);
  }

  fn upload_uniforms(&self, ctx: &RenderContext)
  {
    let aspect = self.aspect();
    let view = ctx.camera.view_matrix();

    let frame = FrameUniform::from_context(ctx, aspect, &self.projection, &self.shadow_volume);
    self.queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&frame));

    self.map.update(&self.queue, ctx.model_matrix(), view);
    self.car.update(&self.queue, ctx.car_matrix(), view);
    self.skybox.update(&self.queue, view, aspect, &self.projection);
  }

  fn record_scene_pass(&self, encoder: &mut wgpu::CommandEncoder, color_view: &wgpu::TextureView, mode: RenderMode)
  {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("Scene Pass"),
      color_attachments: &[Some(wgpu::RenderPassColorAttachment {
        view: color_view,
        resolve_target: None,
        ops: wgpu::Operations { load: wgpu::LoadOp::Clear(CLEAR_COLOR), store: wgpu::StoreOp::Store },
        depth_slice: None,
      })],
      depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
        view: &self.depth.view,
        depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
        stencil_ops: None,
      }),
      ..Default::default()
    });

    pass.set_pipeline(self.pipelines.get(mode));
    pass.set_bind_group(0, &self.frame_bind_group, &[]);
    pass.set_bind_group(3, &self.shadow.sample_bind_group, &[]);

    self.map.draw(&mut pass, true);
    self.car.draw(&mut pass, true);

    // Last, so depth testing hides it behind everything already drawn.
    self.skybox.draw(&mut pass);
  }
}

//
// ──────────────────────────────────────────────────────────────
//   Scene pipelines (one per polygon mode)
// ──────────────────────────────────────────────────────────────
//

struct ScenePipelines
{
  fill: wgpu::RenderPipeline,
  wireframe: Option<wgpu::RenderPipeline>,
  points: Option<wgpu::RenderPipeline>,
}

impl ScenePipelines
{
  fn create(device: &wgpu::Device, format: wgpu::TextureFormat, bind_group_layouts: &[&wgpu::BindGroupLayout]) -> Self
  {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("Scene Shader"),
      source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/scene.wgsl").into()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("Scene Pipeline Layout"),
      bind_group_layouts,
      push_constant_ranges: &[],
    });

    let features = device.features();
    let optional = |feature: wgpu::Features, mode: wgpu::PolygonMode, name: &str| {
      if features.contains(feature)
      {
        Some(create_scene_pipeline(device, &shader, &layout, format, mode))
      }
      else
      {
        warn!("adapter lacks {feature:?}, {name} mode falls back to fill");
        None
      }
    };

    Self {
      fill: create_scene_pipeline(device, &shader, &layout, format, wgpu::PolygonMode::Fill),
      wireframe: optional(wgpu::Features::POLYGON_MODE_LINE, wgpu::PolygonMode::Line, "wireframe"),
      points: optional(wgpu::Features::POLYGON_MODE_POINT, wgpu::PolygonMode::Point, "points"),
    }
  }

  fn get(&self, mode: RenderMode) -> &wgpu::RenderPipeline
  {
    let pipeline = match mode
    {
      RenderMode::Fill => None,
      RenderMode::Wireframe => self.wireframe.as_ref(),
      RenderMode::Points => self.points.as_ref(),
    };

    pipeline.unwrap_or(&self.fill)
  }
}

fn create_scene_pipeline(
  device: &wgpu::Device,
  shader: &wgpu::ShaderModule,
  layout: &wgpu::PipelineLayout,
  format: wgpu::TextureFormat,
  polygon_mode: wgpu::PolygonMode,
) -> wgpu::RenderPipeline
{
  device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
    label: Some(&format!("Scene Pipeline ({polygon_mode:?})")),
    layout: Some(layout),
    vertex: wgpu::VertexState {
      module: shader,
      entry_point: Some("vs_main"),
      buffers: &[ModelVertex::layout()],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    },
    fragment: Some(wgpu::FragmentState {
      module: shader,
      entry_point: Some("fs_main"),
      targets: &[Some(wgpu::ColorTargetState {
        format,
        blend: Some(wgpu::BlendState::REPLACE),
        write_mask: wgpu::ColorWrites::ALL,
      })],
      compilation_options: wgpu::PipelineCompilationOptions::default(),
    }),
    primitive: wgpu::PrimitiveState {
      topology: wgpu::PrimitiveTopology::TriangleList,
      strip_index_format: None,
      front_face: wgpu::FrontFace::Ccw,
      cull_mode: None, // OBJ winding is not reliable across both models
      unclipped_depth: false,
      polygon_mode,
      conservative: false,
    },
    depth_stencil: Some(wgpu::DepthStencilState {
      format: DEPTH_FORMAT,
      depth_write_enabled: true,
      depth_compare: wgpu::CompareFunction::Less,
      stencil: wgpu::StencilState::default(),
      bias: wgpu::DepthBiasState::default(),
    }),
    multisample: wgpu::MultisampleState::default(),
    multiview: None,
    cache: None,
  })
}

//
// ──────────────────────────────────────────────────────────────
//   Initialization Helpers
// ──────────────────────────────────────────────────────────────
//

async fn request_adapter(instance: &wgpu::Instance, surface: &wgpu::Surface<'_>) -> anyhow::Result<wgpu::Adapter>
{
  let adapter = instance
    .request_adapter(&wgpu::RequestAdapterOptions {
      power_preference: wgpu::PowerPreference::HighPerformance,
      compatible_surface: Some(surface),
      force_fallback_adapter: false,
    })
    .await
    .context("no suitable GPU adapter found")?;

  let info = adapter.get_info();
  info!("using {} ({:?})", info.name, info.backend);

  Ok(adapter)
}

async fn request_device(adapter: &wgpu::Adapter) -> anyhow::Result<(wgpu::Device, wgpu::Queue)>
{
  // Wireframe and point modes are optional; take whichever the adapter offers.
  let wanted = wgpu::Features::POLYGON_MODE_LINE | wgpu::Features::POLYGON_MODE_POINT;

  adapter
    .request_device(&wgpu::DeviceDescriptor {
      label: Some("Carview Device"),
      required_features: adapter.features() & wanted,
      required_limits: wgpu::Limits::default(),
      ..Default::default()
    })
    .await
    .context("failed to create GPU device")
}

fn configure_surface(
  window: &Window,
  surface: &wgpu::Surface<'_>,
  adapter: &wgpu::Adapter,
  device: &wgpu::Device,
) -> anyhow::Result<wgpu::SurfaceConfiguration>
{
  let size = window.inner_size();
  let caps = surface.get_capabilities(adapter);

  // Textures are uploaded as sRGB, so the swapchain should be too.
  let format = caps
    .formats
    .iter()
    .copied()
    .find(|f| f.is_srgb())
    .or_else(|| caps.formats.first().copied())
    .context("surface reports no supported formats")?;

  let config = wgpu::SurfaceConfiguration {
    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
    format,
    width: size.width.max(1),
    height: size.height.max(1),
    present_mode: wgpu::PresentMode::Fifo,
    alpha_mode: wgpu::CompositeAlphaMode::Auto,
    view_formats: vec![],
    desired_maximum_frame_latency: 2,
  };

  surface.configure(device, &config);
  Ok(config)
}

fn create_frame_resources(device: &wgpu::Device) -> (wgpu::Buffer, wgpu::BindGroup, wgpu::BindGroupLayout)
{
  let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
    label: Some("Frame Buffer"),
    size: std::mem::size_of::<FrameUniform>() as u64,
    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    mapped_at_creation: false,
  });

  let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
    label: Some("Frame BGL"),
    entries: &[wgpu::BindGroupLayoutEntry {
      binding: 0,
      visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
      ty: wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
      },
      count: None,
    }],
  });

  let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some("Frame BG"),
    layout: &frame_bgl,
    entries: &[wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
  });

  (frame_buffer, frame_bind_group, frame_bgl)
}
