//! Scene-side state: pivot rotation, normalized meshes, zone materials, the
//! countdown raster and the reference grid.

pub mod bounds;
pub mod graph;
pub mod grid;
pub mod materials;
pub mod mesh;
pub mod pivot;
pub mod timer;
