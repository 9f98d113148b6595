//! Getting model bytes into the viewer.
//!
//! The split mirrors who owns what: the host owns file access
//! ([`source::ModelReader`]), the viewer owns the single live payload
//! ([`slot::ResourceSlot`]) and the fetch lifecycle ([`loader::LoadDriver`]),
//! and [`gltf`] turns published bytes into CPU mesh data.

pub mod gltf;
pub mod loader;
pub mod slot;
pub mod source;
