use crate::core::geometry::Vertex;
use nalgebra::{Vector3, Vector4};
use std::ops::{Add, Mul};

/// Per-vertex data that can be blended across a triangle (`a * wa + b * wb + c * wc`).
///
/// Send + Sync because fragments are shaded from rayon workers.
pub trait Interpolatable: Copy + Add<Output = Self> + Mul<f32, Output = Self> + Send + Sync {}

impl<T> Interpolatable for T where T: Copy + Add<Output = T> + Mul<f32, Output = T> + Send + Sync {}

/// The programmable stages the rasterizer drives.
pub trait Shader: Sync {
    type Varying: Interpolatable;

    /// Object-space vertex -> clip-space position plus varyings.
    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying);

    /// Interpolated varyings -> linear RGB. Values outside [0, 1] are clamped on output.
    fn fragment(&self, varying: Self::Varying) -> Vector3<f32>;
}
