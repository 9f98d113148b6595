//! The static ground grid behind the model.
//!
//! The grid is a scene-graph sibling of the rotation pivot, not a child:
//! dragging the model must never move the backdrop.

use wgpu::util::DeviceExt;

/// Line-list vertex with a per-vertex colour so centre lines can stand out.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GridVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl GridVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<GridVertex>() as wgpu::BufferAddress,
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

const CENTER_COLOR: [f32; 3] = [0.42, 0.42, 0.45];
const LINE_COLOR: [f32; 3] = [0.2, 0.2, 0.23];

#[derive(Debug)]
pub struct Grid {
    vertices: Vec<GridVertex>,
    pub buffer: Option<wgpu::Buffer>,
}

impl Grid {
    /// A square grid of `divisions` x `divisions` cells on the XZ plane at
    /// height `y`, centred under the model.
    pub fn new(size: f32, divisions: u32, y: f32) -> Self {
        let half = size / 2.0;
        let step = size / divisions as f32;
        let mut vertices = Vec::with_capacity(((divisions + 1) * 4) as usize);
        for i in 0..=divisions {
            let offset = -half + i as f32 * step;
            let color = if i * 2 == divisions {
                CENTER_COLOR
            } else {
                LINE_COLOR
            };
            // One line along X, one along Z.
            vertices.push(GridVertex {
                position: [-half, y, offset],
                color,
            });
            vertices.push(GridVertex {
                position: [half, y, offset],
                color,
            });
            vertices.push(GridVertex {
                position: [offset, y, -half],
                color,
            });
            vertices.push(GridVertex {
                position: [offset, y, half],
                color,
            });
        }
        Self {
            vertices,
            buffer: None,
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn upload(&mut self, device: &wgpu::Device) {
        self.buffer = Some(device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("grid vertex buffer"),
                contents: bytemuck::cast_slice(&self.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        ));
    }

    pub fn dispose(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            buffer.destroy();
        }
    }
}
