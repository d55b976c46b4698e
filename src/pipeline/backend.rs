use nalgebra::{Matrix4, Vector3};

/// The drawing service the render loop talks to.
///
/// Mirrors a minimal GPU-style API: one vertex buffer (positions + normals sharing an
/// index space), three transform uniforms, one color uniform and indexed triangle draws.
pub trait RenderBackend {
    /// Replaces the vertex buffers. Both slices hold 3 floats per vertex.
    fn upload_vertices(&mut self, positions: &[f32], normals: &[f32]);

    /// Clears color and depth.
    fn clear(&mut self);

    fn set_transforms(&mut self, projection: Matrix4<f32>, view: Matrix4<f32>, model: Matrix4<f32>);

    fn set_color(&mut self, color: Vector3<f32>);

    /// Draws `indices.len() / 3` triangles with the current uniforms.
    fn draw_indexed(&mut self, indices: &[u32]);
}
