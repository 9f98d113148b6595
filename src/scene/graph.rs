//! Scene assembly and per-frame upkeep.
//!
//! A decoded model is normalized exactly once at build time: its bounding
//! box center moves to the origin, a uniform scale brings the largest
//! dimension to [`MODEL_TARGET_SIZE`], and the whole thing is stood upright
//! by a fixed quarter turn about X. Everything interactive afterwards (drag
//! rotation, reset) happens on the [`Pivot`] sitting above that root
//! transform, so the upright never drifts.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Transform};
use wgpu::util::DeviceExt;

use crate::assets::gltf::ModelPayload;
use crate::pipelines::{flat, Pipelines};
use crate::ray::Ray;
use crate::scene::bounds::Aabb;
use crate::scene::grid::Grid;
use crate::scene::materials::{MaterialBank, ZONE_DONE_COLOR, ZONE_PENDING_COLOR};
use crate::scene::mesh::{unit_cube, MeshBuffers, MeshUniform, SceneMesh};
use crate::scene::pivot::Pivot;
use crate::scene::timer::TimerDisplay;
use crate::texture::{create_default_sampler, Texture};

/// Largest model dimension after normalization, in world units.
pub const MODEL_TARGET_SIZE: f32 = 6.0;
/// Fixed upright correction: the bomb is authored lying on its back.
pub const MODEL_UPRIGHT_PITCH: Rad<f32> = Rad(-FRAC_PI_2);

const TIMER_QUAD_WIDTH: f32 = 2.4;
const TIMER_QUAD_HEIGHT: f32 = 1.2;
const TIMER_QUAD_POSITION: [f32; 3] = [0.0, -1.2, 3.4];

const GRID_SIZE: f32 = 10.0;
const GRID_DIVISIONS: u32 = 10;
const GRID_HEIGHT: f32 = -3.2;

/// Result of a successful zone pick.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePick {
    pub mesh_index: usize,
    pub zone: String,
    pub module: String,
    pub distance: f32,
}

struct SceneGpu {
    timer_texture: Texture,
    timer_vertex: wgpu::Buffer,
    timer_index: wgpu::Buffer,
    timer_index_count: u32,
    timer_uniform: wgpu::Buffer,
    timer_bind_group: wgpu::BindGroup,
    timer_texture_bind_group: wgpu::BindGroup,
}

pub struct SceneGraph {
    pub pivot: Pivot,
    meshes: Vec<SceneMesh>,
    zone_index: HashMap<String, usize>,
    materials: MaterialBank,
    timer: TimerDisplay,
    grid: Grid,
    root_transform: Matrix4<f32>,
    bounds: Aabb,
    degraded: bool,
    gpu: Option<SceneGpu>,
}

impl SceneGraph {
    /// Build the scene for a decoded model.
    pub fn assemble(payload: ModelPayload, zone_modules: &HashMap<String, String>) -> Self {
        Self::build(payload, zone_modules, false)
    }

    /// Build the stand-in scene shown when the model cannot be decoded:
    /// a plain grey cube, flagged degraded.
    pub fn placeholder(zone_modules: &HashMap<String, String>) -> Self {
        log::warn!("assembling placeholder scene");
        let payload = ModelPayload {
            meshes: vec![unit_cube("placeholder", [0.35, 0.36, 0.4, 1.0])],
        };
        Self::build(payload, zone_modules, true)
    }

    fn build(payload: ModelPayload, zone_modules: &HashMap<String, String>, degraded: bool) -> Self {
        let mut raw_bounds = Aabb::empty();
        for mesh in &payload.meshes {
            raw_bounds = raw_bounds.union(mesh.bounds());
        }

        let normalize = if raw_bounds.is_empty() {
            Matrix4::identity()
        } else {
            let center = raw_bounds.center();
            let max_dim = raw_bounds.max_dimension();
            // Degenerate (flat or point-sized) models are centered but kept
            // at their native size.
            let scale = if max_dim > f32::EPSILON {
                MODEL_TARGET_SIZE / max_dim
            } else {
                1.0
            };
            Matrix4::from_scale(scale) * Matrix4::from_translation(-center.to_vec())
        };
        let root_transform = Matrix4::from_angle_x(MODEL_UPRIGHT_PITCH) * normalize;

        let mut materials = MaterialBank::new();
        let mut slot_by_source: HashMap<Option<usize>, usize> = HashMap::new();
        let mut meshes = Vec::with_capacity(payload.meshes.len());
        let mut zone_index = HashMap::new();

        for (index, data) in payload.meshes.into_iter().enumerate() {
            // Meshes sharing a source material share a bank slot until one
            // of them needs its own color.
            let slot = *slot_by_source
                .entry(data.material)
                .or_insert_with(|| materials.push(data.base_color));
            let local_bounds = Aabb::from_points(data.positions.iter().map(|p| Point3::from(*p)));
            let frame = root_transform * data.transform;
            let module = zone_modules.get(&data.name).cloned();
            if module.is_some() {
                zone_index.entry(data.name.clone()).or_insert(index);
            }
            meshes.push(SceneMesh {
                data,
                frame,
                local_bounds,
                module,
                material: slot,
                owns_material: false,
                gpu: None,
            });
        }

        for zone in zone_modules.keys() {
            if !zone_index.contains_key(zone) {
                log::warn!("zone `{zone}` has no matching mesh in the model");
            }
        }

        let bounds = raw_bounds.transformed(&root_transform);
        log::debug!(
            "scene assembled: {} meshes, {} zones, degraded: {degraded}",
            meshes.len(),
            zone_index.len()
        );

        Self {
            pivot: Pivot::new(),
            meshes,
            zone_index,
            materials,
            timer: TimerDisplay::new(),
            grid: Grid::new(GRID_SIZE, GRID_DIVISIONS, GRID_HEIGHT),
            root_transform,
            bounds,
            degraded,
            gpu: None,
        }
    }

    pub fn meshes(&self) -> &[SceneMesh] {
        &self.meshes
    }

    pub fn zone_mesh(&self, zone: &str) -> Option<&SceneMesh> {
        self.zone_index.get(zone).map(|&index| &self.meshes[index])
    }

    pub fn materials(&self) -> &MaterialBank {
        &self.materials
    }

    pub fn timer(&self) -> &TimerDisplay {
        &self.timer
    }

    pub fn root_transform(&self) -> Matrix4<f32> {
        self.root_transform
    }

    /// World-space bounds after normalization, before any pivot rotation.
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Push module completion state into mesh colors. A mesh keeps sharing
    /// its source material until the first status write, at which point it
    /// gets a private clone; after that only the color changes. Returns the
    /// indices of meshes whose color actually changed, so repeat calls with
    /// the same status are visibly free.
    pub fn sync_module_colors(&mut self, status: &HashMap<String, bool>) -> Vec<usize> {
        let mut dirty = Vec::new();
        for (index, mesh) in self.meshes.iter_mut().enumerate() {
            let Some(module) = &mesh.module else { continue };
            let Some(done) = status.get(module) else { continue };
            let color = if *done {
                ZONE_DONE_COLOR
            } else {
                ZONE_PENDING_COLOR
            };
            if !mesh.owns_material {
                mesh.material = self.materials.clone_slot(mesh.material);
                mesh.owns_material = true;
            }
            if self.materials.set_color(mesh.material, color) {
                dirty.push(index);
            }
        }
        dirty
    }

    /// Repaint the countdown raster if the second changed. The GPU copy is
    /// refreshed separately in [`frame_sync`].
    ///
    /// [`frame_sync`]: SceneGraph::frame_sync
    pub fn sync_timer(&mut self, seconds: u32) -> bool {
        self.timer.repaint(seconds)
    }

    /// Find the nearest zone-mapped mesh along `ray`, in current pivot
    /// orientation. Meshes without a module mapping can be hit but never
    /// returned; the ray scans past them, so cables or casing in front of a
    /// zone do not block the pick.
    pub fn raycast(&self, ray: &Ray) -> Option<ZonePick> {
        let pivot_matrix = self.pivot.matrix();
        let mut hits: Vec<(f32, usize)> = Vec::new();

        for (index, mesh) in self.meshes.iter().enumerate() {
            let world = pivot_matrix * mesh.frame;
            let Some(inverse) = world.invert() else { continue };
            let local_ray = ray.transformed(&inverse);
            if local_ray.aabb_hit(&mesh.local_bounds).is_none() {
                continue;
            }
            let Some(local_t) = local_ray.mesh_hit(&mesh.data.positions, &mesh.data.indices)
            else {
                continue;
            };
            let hit_world = world.transform_point(local_ray.point_at(local_t));
            hits.push(((hit_world - ray.origin).magnitude(), index));
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (distance, index) in hits {
            let mesh = &self.meshes[index];
            if let Some(module) = &mesh.module {
                return Some(ZonePick {
                    mesh_index: index,
                    zone: mesh.name().to_owned(),
                    module: module.clone(),
                    distance,
                });
            }
        }
        None
    }

    /// Create the GPU residency for every mesh, the grid and the timer quad.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, pipelines: &Pipelines) {
        for mesh in &mut self.meshes {
            let uniform = MeshUniform {
                model: mesh.frame.into(),
                color: self.materials.color(mesh.material),
            };
            mesh.gpu = Some(MeshBuffers::new(
                device,
                &pipelines.mesh_bind_group_layout,
                &mesh.data,
                uniform,
            ));
        }
        self.grid.upload(device);

        let (vertices, indices) = flat::mk_quad(TIMER_QUAD_WIDTH, TIMER_QUAD_HEIGHT);
        let timer_vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("timer_quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let timer_index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("timer_quad_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = MeshUniform {
            model: Matrix4::from_translation(TIMER_QUAD_POSITION.into()).into(),
            color: [1.0, 1.0, 1.0, 1.0],
        };
        let timer_uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("timer_quad_uniform_buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let timer_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("timer_quad_bind_group"),
            layout: &pipelines.mesh_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: timer_uniform.as_entire_binding(),
            }],
        });

        let timer_texture = Texture::from_raster(device, queue, self.timer.raster(), "timer_texture");
        let sampler = timer_texture
            .sampler
            .clone()
            .unwrap_or_else(|| create_default_sampler(device));
        let timer_texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("timer_texture_bind_group"),
            layout: &pipelines.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&timer_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        self.gpu = Some(SceneGpu {
            timer_texture,
            timer_vertex,
            timer_index,
            timer_index_count: indices.len() as u32,
            timer_uniform,
            timer_bind_group,
            timer_texture_bind_group,
        });
    }

    /// Per-frame CPU-to-GPU sync: module colors and the countdown texture.
    pub fn frame_sync(
        &mut self,
        status: &HashMap<String, bool>,
        seconds: u32,
        queue: &wgpu::Queue,
    ) {
        self.sync_module_colors(status);
        if self.sync_timer(seconds) {
            if let Some(gpu) = &self.gpu {
                gpu.timer_texture.update_from_raster(queue, self.timer.raster());
            }
        }
    }

    /// Upload the per-mesh uniforms for the current pivot orientation. The
    /// timer quad rides inside the pivot, so it turns with the bomb.
    pub fn write_frame_uniforms(&self, queue: &wgpu::Queue) {
        let pivot_matrix = self.pivot.matrix();
        for mesh in &self.meshes {
            let Some(gpu) = &mesh.gpu else { continue };
            let uniform = MeshUniform {
                model: (pivot_matrix * mesh.frame).into(),
                color: self.materials.color(mesh.material),
            };
            queue.write_buffer(&gpu.uniform, 0, bytemuck::cast_slice(&[uniform]));
        }
        if let Some(gpu) = &self.gpu {
            let model = pivot_matrix * Matrix4::from_translation(TIMER_QUAD_POSITION.into());
            let uniform = MeshUniform {
                model: model.into(),
                color: [1.0, 1.0, 1.0, 1.0],
            };
            queue.write_buffer(&gpu.timer_uniform, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    pub fn draw(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        pipelines: &Pipelines,
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
    ) {
        if let Some(buffer) = &self.grid.buffer {
            pass.set_pipeline(&pipelines.grid);
            pass.set_bind_group(0, camera_bind_group, &[]);
            pass.set_vertex_buffer(0, buffer.slice(..));
            pass.draw(0..self.grid.vertex_count(), 0..1);
        }

        pass.set_pipeline(&pipelines.mesh);
        pass.set_bind_group(0, camera_bind_group, &[]);
        pass.set_bind_group(1, light_bind_group, &[]);
        for mesh in &self.meshes {
            let Some(gpu) = &mesh.gpu else { continue };
            pass.set_bind_group(2, &gpu.bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.vertex.slice(..));
            pass.set_index_buffer(gpu.index.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..gpu.index_count, 0, 0..1);
        }

        if let Some(gpu) = &self.gpu {
            pass.set_pipeline(&pipelines.flat);
            pass.set_bind_group(0, camera_bind_group, &[]);
            pass.set_bind_group(1, &gpu.timer_bind_group, &[]);
            pass.set_bind_group(2, &gpu.timer_texture_bind_group, &[]);
            pass.set_vertex_buffer(0, gpu.timer_vertex.slice(..));
            pass.set_index_buffer(gpu.timer_index.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..gpu.timer_index_count, 0, 0..1);
        }
    }

    /// Destroy every GPU resource the scene holds. Safe to call twice and on
    /// scenes that were never uploaded.
    pub fn dispose(&mut self) {
        let mut released = false;
        for mesh in &mut self.meshes {
            if let Some(gpu) = mesh.gpu.take() {
                gpu.dispose();
                released = true;
            }
        }
        self.grid.dispose();
        if let Some(gpu) = self.gpu.take() {
            gpu.timer_texture.dispose();
            gpu.timer_vertex.destroy();
            gpu.timer_index.destroy();
            gpu.timer_uniform.destroy();
            released = true;
        }
        if released {
            log::debug!("scene GPU resources disposed");
        }
    }
}
