//! Colour slots for scene meshes.
//!
//! Meshes keep sharing the colour slots they arrived with until module state
//! first writes to them. That first write gives the mesh a private copy of
//! its slot, so recolouring one zone can never bleed into another zone or
//! into the shared default.

/// Zone tint for a completed module.
pub const ZONE_DONE_COLOR: [f32; 4] = [0.18, 0.78, 0.42, 1.0];
/// Zone tint for a module that is still pending.
pub const ZONE_PENDING_COLOR: [f32; 4] = [0.78, 0.2, 0.16, 1.0];

/// A flat pool of RGBA colour slots, indexed by the meshes that use them.
#[derive(Clone, Debug, Default)]
pub struct MaterialBank {
    colors: Vec<[f32; 4]>,
    clones: usize,
}

impl MaterialBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a slot and return its index.
    pub fn push(&mut self, color: [f32; 4]) -> usize {
        self.colors.push(color);
        self.colors.len() - 1
    }

    /// Duplicate an existing slot. The original keeps its colour; the copy
    /// is what gets written to from now on.
    pub fn clone_slot(&mut self, slot: usize) -> usize {
        let color = self.colors[slot];
        self.clones += 1;
        self.push(color)
    }

    pub fn color(&self, slot: usize) -> [f32; 4] {
        self.colors[slot]
    }

    /// Write a colour. Returns whether the slot actually changed, so callers
    /// can skip GPU rewrites for no-op syncs.
    pub fn set_color(&mut self, slot: usize, color: [f32; 4]) -> bool {
        if self.colors[slot] == color {
            return false;
        }
        self.colors[slot] = color;
        true
    }

    /// How many clone-on-write copies have been made. Stable across repeated
    /// syncs with unchanged input.
    pub fn clone_count(&self) -> usize {
        self.clones
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
