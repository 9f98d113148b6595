//! Mouse-ray math for zone picking.
//!
//! A click becomes a world-space [`Ray`] (see
//! [`crate::camera::Camera::cast_ray_from_screen`]), which is then tested
//! against each mesh: first the slab test against the mesh's local bounds,
//! then Möller–Trumbore against its triangles. Triangles are hit from both
//! sides so thin shells stay pickable while the model spins.

use cgmath::{InnerSpace, Matrix4, Point3, Transform, Vector3};

use crate::scene::bounds::Aabb;

const RAY_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }

    /// The same ray expressed in another space (usually mesh-local, via the
    /// inverse world matrix). The direction is deliberately left
    /// unnormalised; hit distances are converted back to world units from
    /// the hit point, not from `t`.
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> Ray {
        Ray {
            origin: matrix.transform_point(self.origin),
            direction: matrix.transform_vector(self.direction),
        }
    }

    /// Slab test. Returns the entry distance along the ray, or `None` when
    /// the box is missed entirely or lies behind the origin.
    ///
    /// Division by a zero direction component yields an infinity and the
    /// comparisons below still do the right thing, so axis-parallel rays
    /// need no special casing.
    pub fn aabb_hit(&self, aabb: &Aabb) -> Option<f32> {
        if aabb.is_empty() {
            return None;
        }
        let mut t_near = 0.0f32;
        let mut t_far = f32::INFINITY;
        for axis in 0..3 {
            let inv = 1.0 / self.direction[axis];
            let mut t0 = (aabb.min[axis] - self.origin[axis]) * inv;
            let mut t1 = (aabb.max[axis] - self.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_far < t_near {
                return None;
            }
        }
        Some(t_near)
    }

    /// Möller–Trumbore without backface culling. Returns the distance along
    /// the (possibly unnormalised) direction.
    pub fn triangle_hit(
        &self,
        a: Point3<f32>,
        b: Point3<f32>,
        c: Point3<f32>,
    ) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let det = edge1.dot(p);
        if det.abs() < RAY_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(q) * inv_det;
        (t > RAY_EPSILON).then_some(t)
    }

    /// Nearest triangle hit over an indexed mesh, as a distance along this
    /// ray's direction.
    pub fn mesh_hit(&self, positions: &[[f32; 3]], indices: &[u32]) -> Option<f32> {
        let mut nearest: Option<f32> = None;
        for tri in indices.chunks_exact(3) {
            let (Some(a), Some(b), Some(c)) = (
                positions.get(tri[0] as usize),
                positions.get(tri[1] as usize),
                positions.get(tri[2] as usize),
            ) else {
                continue;
            };
            if let Some(t) =
                self.triangle_hit(Point3::from(*a), Point3::from(*b), Point3::from(*c))
            {
                if nearest.is_none_or(|best| t < best) {
                    nearest = Some(t);
                }
            }
        }
        nearest
    }
}
