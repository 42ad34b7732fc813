use std::path::{Path, PathBuf};

use anyhow::Context;
use glam::Mat4;
use log::{info, warn};
use wgpu::util::DeviceExt;

use super::texture;
use super::uniforms::ObjectUniform;

//
// ──────────────────────────────────────────────────────────────
//   Vertex layout: [x, y, z,  nx, ny, nz,  u, v]
// ──────────────────────────────────────────────────────────────
//

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex
{
  pub position: [f32; 3],
  pub normal: [f32; 3],
  pub uv: [f32; 2],
}

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
  0 => Float32x3,  // position
  1 => Float32x3,  // normal
  2 => Float32x2,  // uv
];

impl ModelVertex
{
  pub fn layout() -> wgpu::VertexBufferLayout<'static>
  {
    wgpu::VertexBufferLayout {
      array_stride: std::mem::size_of::<ModelVertex>() as u64,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &VERTEX_ATTRIBUTES,
    }
  }
}

//
// ──────────────────────────────────────────────────────────────
//   CPU side: parsed OBJ
// ──────────────────────────────────────────────────────────────
//

pub struct MeshData
{
  pub vertices: Vec<ModelVertex>,
  pub indices: Vec<u32>,
  pub material: Option<usize>,
}

pub struct MaterialData
{
  pub name: String,
  pub diffuse_texture: Option<PathBuf>,
  pub diffuse_color: [f32; 3],
}

pub struct ModelData
{
  pub meshes: Vec<MeshData>,
  pub materials: Vec<MaterialData>,
}

const FALLBACK_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];
const FALLBACK_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

pub fn load_obj(path: &Path) -> anyhow::Result<ModelData>
{
  let (models, materials) =
    tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).with_context(|| format!("loading model {}", path.display()))?;

  let materials = materials.unwrap_or_else(|err| {
    warn!("{}: no usable material library ({err}), drawing untextured", path.display());
    Vec::new()
  });

  let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

  let data = ModelData {
    meshes: models.iter().map(|m| mesh_from_obj(&m.mesh)).collect(),
    materials: materials.iter().map(|m| material_from_obj(m, base_dir)).collect(),
  };

  if data.meshes.iter().all(|m| m.indices.is_empty())
  {
    anyhow::bail!("model {} contains no triangles", path.display());
  }

  info!(
    "loaded {} ({} meshes, {} materials, {} triangles)",
    path.display(),
    data.meshes.len(),
    data.materials.len(),
    data.meshes.iter().map(|m| m.indices.len() / 3).sum::<usize>()
  );

  Ok(data)
}

fn mesh_from_obj(mesh: &tobj::Mesh) -> MeshData
{
  let vertex_count = mesh.positions.len() / 3;

  let vertices = (0..vertex_count)
    .map(|i| {
      let position = [mesh.positions[i * 3], mesh.positions[i * 3 + 1], mesh.positions[i * 3 + 2]];

      let normal = if mesh.normals.len() >= (i + 1) * 3
      {
        [mesh.normals[i * 3], mesh.normals[i * 3 + 1], mesh.normals[i * 3 + 2]]
      }
      else
      {
        FALLBACK_NORMAL
      };

      // OBJ puts v = 0 at the bottom of the image, wgpu at the top.
      let uv = if mesh.texcoords.len() >= (i + 1) * 2
      {
        [mesh.texcoords[i * 2], 1.0 - mesh.texcoords[i * 2 + 1]]
      }
      else
      {
        [0.0, 0.0]
      };

      ModelVertex { position, normal, uv }
    })
    .collect();

  MeshData { vertices, indices: mesh.indices.clone(), material: mesh.material_id }
}

fn material_from_obj(material: &tobj::Material, base_dir: &Path) -> MaterialData
{
  MaterialData {
    name: material.name.clone(),
    diffuse_texture: material.diffuse_texture.as_ref().map(|t| base_dir.join(t)),
    diffuse_color: material.diffuse.unwrap_or(FALLBACK_COLOR),
  }
}

//
// ──────────────────────────────────────────────────────────────
//   GPU side
// ──────────────────────────────────────────────────────────────
//

struct GpuMesh
{
  vertex_buffer: wgpu::Buffer,
  index_buffer: wgpu::Buffer,
  index_count: u32,
  material: usize,
}

pub struct Model
{
  meshes: Vec<GpuMesh>,
  materials: Vec<wgpu::BindGroup>,
  object_buffer: wgpu::Buffer,
  object_bind_group: wgpu::BindGroup,
}

/// Bind group layouts shared by every model.
pub struct ModelLayouts
{
  pub object: wgpu::BindGroupLayout,
  pub material: wgpu::BindGroupLayout,
  pub sampler: wgpu::Sampler,
}

impl ModelLayouts
{
  pub fn create(device: &wgpu::Device) -> Self
  {
    let object = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("Object BGL"),
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

    let material = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
      label: Some("Material BGL"),
      entries: &[
        wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
          },
          count: None,
        },
        wgpu::BindGroupLayoutEntry {
          binding: 1,
          visibility: wgpu::ShaderStages::FRAGMENT,
          ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
          count: None,
        },
      ],
    });

    let sampler = texture::linear_sampler(device, "Material Sampler", wgpu::AddressMode::Repeat);

    Self { object, material, sampler }
  }
}

impl Model
{
  pub fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    data: &ModelData,
    layouts: &ModelLayouts,
  ) -> Self
  {
    let mut materials: Vec<wgpu::BindGroup> = data
      .materials
      .iter()
      .map(|m| material_bind_group(device, queue, layouts, m))
      .collect();

    // Meshes without a material (or with a bad index) draw with plain white.
    let fallback = materials.len();
    materials.push(bind_material(
      device,
      layouts,
      &texture::solid_color(device, queue, "Fallback Material", FALLBACK_COLOR),
    ));

    let meshes = data
      .meshes
      .iter()
      .filter(|m| !m.indices.is_empty())
      .map(|m| GpuMesh {
        vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
          label: Some(label),
          contents: bytemuck::cast_slice(&m.vertices),
          usage: wgpu::BufferUsages::VERTEX,
        }),
        index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
          label: Some(label),
          contents: bytemuck::cast_slice(&m.indices),
          usage: wgpu::BufferUsages::INDEX,
        }),
        index_count: m.indices.len() as u32,
        material: m.material.filter(|&i| i < fallback).unwrap_or(fallback),
      })
      .collect();

    let object_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some(label),
      contents: bytemuck::bytes_of(&ObjectUniform::new(Mat4::IDENTITY, Mat4::IDENTITY)),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let object_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      label: Some(label),
      layout: &layouts.object,
      entries: &[wgpu::BindGroupEntry { binding: 0, resource: object_buffer.as_entire_binding() }],
    });

    Self { meshes, materials, object_buffer, object_bind_group }
  }

  pub fn update(&self, queue: &wgpu::Queue, model: Mat4, view: Mat4)
  {
    let uniform = ObjectUniform::new(model, view);
    queue.write_buffer(&self.object_buffer, 0, bytemuck::bytes_of(&uniform));
  }

  /// Issue the draws. The object uniform goes to group 1, materials to group 2
  /// unless `with_materials` is false (depth-only passes).
  pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, with_materials: bool)
  {
    pass.set_bind_group(1, &self.object_bind_group, &[]);

    for mesh in &self.meshes
    {
      if with_materials
      {
        pass.set_bind_group(2, &self.materials[mesh.material], &[]);
      }

      pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
      pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
      pass.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
  }
}

fn material_bind_group(
  device: &wgpu::Device,
  queue: &wgpu::Queue,
  layouts: &ModelLayouts,
  material: &MaterialData,
) -> wgpu::BindGroup
{
  let image = material.diffuse_texture.as_deref().and_then(|path| match texture::load_rgba(path)
  {
    Ok(img) => Some(img),
    Err(err) =>
    {
      warn!("material {}: {err:#}, using its diffuse colour", material.name);
      None
    }
  });

  let view = match image
  {
    Some(img) => texture::create_2d(device, queue, &material.name, &img),
    None => texture::solid_color(device, queue, &material.name, material.diffuse_color),
  };

  bind_material(device, layouts, &view)
}

fn bind_material(device: &wgpu::Device, layouts: &ModelLayouts, view: &wgpu::TextureView) -> wgpu::BindGroup
{
  device.create_bind_group(&wgpu::BindGroupDescriptor {
    label: Some("Material BG"),
    layout: &layouts.material,
    entries: &[
      wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(view) },
      wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(&layouts.sampler) },
    ],
  })
}

#[cfg(test)]
mod tests
{
  use super::*;

  fn triangle() -> tobj::Mesh
  {
    tobj::Mesh {
      positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
      indices: vec![0, 1, 2],
      ..Default::default()
    }
  }

  #[test]
  fn missing_normals_and_uvs_get_fallbacks()
  {
    let mesh = mesh_from_obj(&triangle());

    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    assert!(mesh.vertices.iter().all(|v| v.normal == FALLBACK_NORMAL && v.uv == [0.0, 0.0]));
    assert_eq!(mesh.vertices[1].position, [1.0, 0.0, 0.0]);
    assert_eq!(mesh.material, None);
  }

  #[test]
  fn texcoords_are_flipped_vertically()
  {
    let mut obj = triangle();
    obj.texcoords = vec![0.0, 0.0, 1.0, 0.25, 0.5, 1.0];
    obj.normals = vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
    obj.material_id = Some(2);

    let mesh = mesh_from_obj(&obj);

    assert_eq!(mesh.vertices[0].uv, [0.0, 1.0]);
    assert_eq!(mesh.vertices[1].uv, [1.0, 0.75]);
    assert_eq!(mesh.vertices[2].uv, [0.5, 0.0]);
    assert_eq!(mesh.vertices[2].normal, [0.0, 0.0, 1.0]);
    assert_eq!(mesh.material, Some(2));
  }

  #[test]
  fn material_textures_resolve_next_to_the_obj()
  {
    let material = tobj::Material {
      name: "body".to_string(),
      diffuse_texture: Some("textures/paint.png".to_string()),
      ..Default::default()
    };

    let data = material_from_obj(&material, Path::new("models/Car"));

    assert_eq!(data.diffuse_texture, Some(PathBuf::from("models/Car/textures/paint.png")));
    assert_eq!(data.diffuse_color, FALLBACK_COLOR);
  }

  #[test]
  fn vertex_layout_matches_struct()
  {
    let layout = ModelVertex::layout();

    assert_eq!(layout.array_stride, 32);
    assert_eq!(layout.attributes[2].offset, 24);
  }

  #[test]
  fn loading_a_missing_obj_fails_with_path()
  {
    let err = load_obj(Path::new("models/none/missing.obj")).err().expect("missing file must fail");
    assert!(format!("{err:#}").contains("missing.obj"));
  }

  #[test]
  fn loads_obj_from_disk()
  {
    let dir = std::env::temp_dir().join("carview-model-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("quad.obj");
    std::fs::write(
      &path,
      "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nvn 0 0 1\nvt 0 0\nvt 1 0\nvt 1 1\nvt 0 1\n\
       f 1/1/1 2/2/1 3/3/1 4/4/1\n",
    )
    .unwrap();

    let data = load_obj(&path).unwrap();

    assert_eq!(data.meshes.len(), 1);
    assert_eq!(data.meshes[0].indices.len(), 6);
    assert!(data.materials.is_empty());

    std::fs::remove_dir_all(&dir).ok();
  }
}
