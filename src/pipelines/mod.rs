//! Render pipelines for the three draw passes: lit bomb meshes, the
//! reference grid, and the textured countdown quad.

pub mod flat;
pub mod grid;
pub mod light;
pub mod mesh;

pub use mesh::mk_render_pipeline;

/// All pipelines plus the bind group layouts per-object resources need.
pub struct Pipelines {
    pub mesh: wgpu::RenderPipeline,
    pub grid: wgpu::RenderPipeline,
    pub flat: wgpu::RenderPipeline,
    pub mesh_bind_group_layout: wgpu::BindGroupLayout,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        camera_layout: &wgpu::BindGroupLayout,
        light_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let mesh_bind_group_layout = mesh::mk_mesh_bind_group_layout(device);
        let texture_bind_group_layout = flat::mk_texture_bind_group_layout(device);

        let mesh = mesh::mk_mesh_pipeline(
            device,
            config,
            camera_layout,
            light_layout,
            &mesh_bind_group_layout,
        );
        let grid = grid::mk_grid_pipeline(device, config, camera_layout);
        let flat = flat::mk_flat_pipeline(
            device,
            config,
            camera_layout,
            &mesh_bind_group_layout,
            &texture_bind_group_layout,
        );

        Self {
            mesh,
            grid,
            flat,
            mesh_bind_group_layout,
            texture_bind_group_layout,
        }
    }
}
