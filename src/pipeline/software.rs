use crate::core::framebuffer::FrameBuffer;
use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use crate::core::rasterizer::Rasterizer;
use crate::pipeline::backend::RenderBackend;
use crate::pipeline::shaders::lit::LitShader;
use log::warn;
use nalgebra::{Matrix4, Point3, Vector3};

/// CPU implementation of [`RenderBackend`] on top of the rayon rasterizer.
pub struct SoftwareBackend {
    pub rasterizer: Rasterizer,
    pub framebuffer: FrameBuffer,
    pub background: Vector3<f32>,
    vertices: Vec<Vertex>,
    projection: Matrix4<f32>,
    view: Matrix4<f32>,
    model: Matrix4<f32>,
    color: Vector3<f32>,
}

impl SoftwareBackend {
    /// sample_count: 1 for no AA, 2 for 2x2 SSAA, etc.
    pub fn new(width: usize, height: usize, sample_count: usize, background: Vector3<f32>) -> Self {
        Self {
            rasterizer: Rasterizer::new(),
            framebuffer: FrameBuffer::new(width, height, sample_count),
            background,
            vertices: Vec::new(),
            projection: Matrix4::identity(),
            view: Matrix4::identity(),
            model: Matrix4::identity(),
            color: Vector3::zeros(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }
}

impl RenderBackend for SoftwareBackend {
    fn upload_vertices(&mut self, positions: &[f32], normals: &[f32]) {
        self.vertices = positions
            .chunks_exact(3)
            .enumerate()
            .map(|(i, p)| {
                let normal = normals
                    .get(i * 3..i * 3 + 3)
                    .map_or_else(Vector3::zeros, Vector3::from_column_slice);
                Vertex::new(Point3::new(p[0], p[1], p[2]), normal)
            })
            .collect();
    }

    fn clear(&mut self) {
        self.framebuffer.clear(self.background, 1.0);
    }

    fn set_transforms(&mut self, projection: Matrix4<f32>, view: Matrix4<f32>, model: Matrix4<f32>) {
        self.projection = projection;
        self.view = view;
        self.model = model;
    }

    fn set_color(&mut self, color: Vector3<f32>) {
        self.color = color;
    }

    fn draw_indexed(&mut self, indices: &[u32]) {
        let shader = LitShader::new(self.projection, self.view, self.model, self.color);

        for tri in indices.chunks_exact(3) {
            let fetched = [tri[0], tri[1], tri[2]].map(|i| self.vertices.get(i as usize));
            let [Some(v0), Some(v1), Some(v2)] = fetched else {
                warn!("Skipping triangle {:?}: index beyond {} vertices", tri, self.vertices.len());
                continue;
            };

            self.rasterizer.rasterize_triangle(
                &mut self.framebuffer,
                &shader,
                [shader.vertex(v0), shader.vertex(v1), shader.vertex(v2)],
            );
        }
    }
}
