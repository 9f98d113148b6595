//! The rotation pivot that all user drags act on.
//!
//! The model never rotates itself; it hangs inside this pivot and the pivot
//! accumulates the drag input. Keeping raw per-axis angle sums (rather than
//! composing incremental rotations) makes the orientation a pure function of
//! the accumulated deltas and lets a reset restore exact zeros.

use cgmath::{Matrix4, Rad};

/// Accumulated free rotation of the model container.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pivot {
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
    pub roll: Rad<f32>,
}

impl Pivot {
    pub fn new() -> Self {
        Self {
            yaw: Rad(0.0),
            pitch: Rad(0.0),
            roll: Rad(0.0),
        }
    }

    /// Fold a pointer delta into the accumulators. Horizontal movement spins
    /// about Y, vertical movement about X. The pitch is intentionally not
    /// clamped; the model may be turned fully upside down.
    pub fn apply_drag(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw += Rad(dx * sensitivity);
        self.pitch += Rad(dy * sensitivity);
    }

    /// Back to the authored orientation, exactly. All three axes are zeroed
    /// even though no input currently feeds the roll axis.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_identity(&self) -> bool {
        self.yaw.0 == 0.0 && self.pitch.0 == 0.0 && self.roll.0 == 0.0
    }

    /// The pivot's world matrix. Composition order is fixed
    /// (pitch ∘ yaw ∘ roll) so a vertical drag always tips the model about
    /// the world X axis no matter how far it has been spun.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(self.pitch)
            * Matrix4::from_angle_y(self.yaw)
            * Matrix4::from_angle_z(self.roll)
    }
}

impl Default for Pivot {
    fn default() -> Self {
        Self::new()
    }
}
