//! Mesh data on its way from the decoded payload into the scene.
//!
//! Geometry stays on the CPU for the lifetime of the scene: picking walks the
//! triangles directly, and headless code (tests, tooling) can assemble and
//! query a scene without a GPU. The buffer pair in [`MeshBuffers`] is created
//! once at upload time and destroyed at dispose time.

use cgmath::{Matrix4, Point3, Transform};
use wgpu::util::DeviceExt;

use crate::scene::bounds::Aabb;

/// Vertex layout shared by the model, the placeholder and the timer quad's
/// mesh-side sibling pipelines.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Per-mesh shader data: the composed world matrix and the resolved colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

/// One mesh as it came out of the payload: raw geometry plus the node
/// transform that was baked while walking the source hierarchy.
#[derive(Clone, Debug)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    pub transform: Matrix4<f32>,
    pub base_color: [f32; 4],
    /// Source material index; meshes sharing it share a colour slot until
    /// the first module-driven write.
    pub material: Option<usize>,
}

impl MeshData {
    /// Bounds of the node-transformed positions, i.e. where this mesh sits
    /// in the payload's own space.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(
            self.positions
                .iter()
                .map(|p| self.transform.transform_point(Point3::from(*p))),
        )
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn vertices(&self) -> Vec<MeshVertex> {
        self.positions
            .iter()
            .zip(self.normals.iter())
            .map(|(position, normal)| MeshVertex {
                position: *position,
                normal: *normal,
            })
            .collect()
    }
}

/// A deterministic stand-in body used when decoding fails: a unit cube with
/// flat-shaded faces.
pub fn unit_cube(name: &str, color: [f32; 4]) -> MeshData {
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +Z
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        // +X
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = positions.len() as u32;
        for corner in corners {
            positions.push(corner);
            normals.push(normal);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    MeshData {
        name: name.to_owned(),
        positions,
        normals,
        indices,
        transform: cgmath::SquareMatrix::identity(),
        base_color: color,
        material: None,
    }
}

/// A mesh mounted in the scene graph.
#[derive(Debug)]
pub struct SceneMesh {
    pub data: MeshData,
    /// Composed root-normalisation * node transform; constant for the
    /// scene's lifetime. The pivot matrix is applied on top every frame.
    pub frame: Matrix4<f32>,
    /// Bounds of the raw (untransformed) positions, for the pick pre-test
    /// in mesh-local space.
    pub local_bounds: Aabb,
    /// Module id this mesh is mapped to, if it is a clickable zone.
    pub module: Option<String>,
    /// Colour slot in the scene's material bank.
    pub material: usize,
    /// Set once this mesh got its private colour slot.
    pub owns_material: bool,
    pub gpu: Option<MeshBuffers>,
}

impl SceneMesh {
    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn is_zone(&self) -> bool {
        self.module.is_some()
    }
}

/// The GPU half of a scene mesh.
#[derive(Debug)]
pub struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: wgpu::Buffer,
    pub uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub index_count: u32,
}

impl MeshBuffers {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        data: &MeshData,
        uniform: MeshUniform,
    ) -> Self {
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} vertex buffer", data.name)),
            contents: bytemuck::cast_slice(&data.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} index buffer", data.name)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} uniform buffer", data.name)),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform.as_entire_binding(),
            }],
            label: Some(&format!("{} bind group", data.name)),
        });
        Self {
            vertex,
            index,
            uniform,
            bind_group,
            index_count: data.indices.len() as u32,
        }
    }

    /// Free the GPU allocations eagerly instead of waiting for drop.
    pub fn dispose(self) {
        self.vertex.destroy();
        self.index.destroy();
        self.uniform.destroy();
    }
}
