//! fuseview
//!
//! An interactive viewer for a bomb-defusal teaching game. It fetches a GLB
//! bomb model, stands it upright at a fixed size, lets the player spin it
//! with the mouse and click defusal zones, and keeps an in-scene countdown
//! and per-module status colors in step with the host every frame. Built on
//! wgpu and winit; decode failures fall back to a placeholder scene so the
//! game stays playable.
//!
//! High-level modules
//! - `assets`: model fetching, the single live payload and GLB decoding
//! - `camera`: fixed camera, projection and screen-to-world pick rays
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `interaction`: pointer state machine for drag rotation and zone clicks
//! - `pipelines`: render pipelines (lit mesh, grid, textured quad) and the light
//! - `ray`: ray/triangle and ray/box intersection used for picking
//! - `scene`: scene assembly, normalization, zone materials, the timer raster
//! - `viewer`: the window shell, host hooks and lifecycle
//!

pub mod assets;
pub mod camera;
pub mod context;
pub mod error;
pub mod interaction;
pub mod pipelines;
pub mod ray;
pub mod scene;
pub mod texture;
pub mod viewer;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::dpi::PhysicalPosition;
pub use cgmath::*;
pub use winit::event::{ElementState, MouseButton, WindowEvent};
pub use winit::keyboard::{KeyCode, PhysicalKey};
pub use wgpu::*;
