use crate::core::framebuffer::FrameBuffer;
use crate::core::math::interpolation::{barycentric, covers, edge_function, perspective_correct};
use crate::core::math::transform::{ndc_to_screen, perspective_divide};
use crate::core::pipeline::{Interpolatable, Shader};
use nalgebra::{Point2, Vector4};
use rayon::prelude::*;

/// A clip-space vertex together with its shader varyings.
type ClipVertex<V> = (Vector4<f32>, V);

/// Signed distance to each clip plane; a vertex is kept where the distance is >= 0.
/// X/Y are not clipped geometrically, the bounding-box scissor takes care of them.
const CLIP_PLANES: [fn(&Vector4<f32>) -> f32; 3] = [
    |p| p.w - 1e-5, // w > 0, keeps the perspective divide finite
    |p| p.z + p.w,  // near
    |p| p.w - p.z,  // far
];

/// Scan-converts triangles into a [`FrameBuffer`] with a LEQUAL depth test.
///
/// No face culling: both windings are filled.
#[derive(Debug, Default, Clone, Copy)]
pub struct Rasterizer;

impl Rasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Clips the triangle against near/far, fans the remaining polygon and fills it.
    pub fn rasterize_triangle<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        triangle: [ClipVertex<S::Varying>; 3],
    ) {
        let mut polygon: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(8);
        let mut scratch: Vec<ClipVertex<S::Varying>> = Vec::with_capacity(8);
        polygon.extend_from_slice(&triangle);

        for plane in CLIP_PLANES {
            clip_against(&polygon, &mut scratch, plane);
            std::mem::swap(&mut polygon, &mut scratch);
            if polygon.len() < 3 {
                return;
            }
        }

        let first = polygon[0];
        for pair in polygon[1..].windows(2) {
            self.fill(framebuffer, shader, [first, pair[0], pair[1]]);
        }
    }

    fn fill<S: Shader>(
        &self,
        framebuffer: &mut FrameBuffer,
        shader: &S,
        triangle: [ClipVertex<S::Varying>; 3],
    ) {
        let width = framebuffer.buffer_width as f32;
        let height = framebuffer.buffer_height as f32;

        let mut screen = [Point2::origin(); 3];
        let mut depth = [0.0f32; 3];
        let mut w = [0.0f32; 3];
        for (i, (clip, _)) in triangle.iter().enumerate() {
            let ndc = perspective_divide(clip);
            screen[i] = ndc_to_screen(ndc.x, ndc.y, width, height);
            depth[i] = ndc.z * 0.5 + 0.5;
            w[i] = clip.w;
        }

        let min_x = screen.iter().map(|p| p.x).fold(f32::INFINITY, f32::min).floor();
        let max_x = screen.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max).ceil();
        let min_y = screen.iter().map(|p| p.y).fold(f32::INFINITY, f32::min).floor();
        let max_y = screen.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max).ceil();

        if max_x < 0.0 || max_y < 0.0 || min_x >= width || min_y >= height {
            return;
        }
        if edge_function(screen[0], screen[1], screen[2]).abs() < 1e-6 {
            return;
        }

        let x0 = min_x.max(0.0) as usize;
        let x1 = (max_x as usize).min(framebuffer.buffer_width - 1);
        let y0 = min_y.max(0.0) as usize;
        let y1 = (max_y as usize).min(framebuffer.buffer_height - 1);

        let varyings = [triangle[0].1, triangle[1].1, triangle[2].1];

        framebuffer
            .rows_mut(y0, y1)
            .for_each(|(y, color_row, depth_row)| {
                for x in x0..=x1 {
                    let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let Some(bary) = barycentric(p, screen[0], screen[1], screen[2]) else {
                        continue;
                    };
                    if !covers(&bary) {
                        continue;
                    }

                    // NDC depth is affine in screen space, so screen weights are correct here.
                    let z = bary.x * depth[0] + bary.y * depth[1] + bary.z * depth[2];
                    if z > depth_row[x] {
                        continue;
                    }

                    let Some(pc) = perspective_correct(&bary, w) else {
                        continue;
                    };
                    let varying = varyings[0] * pc.x + varyings[1] * pc.y + varyings[2] * pc.z;

                    depth_row[x] = z;
                    color_row[x] = shader.fragment(varying);
                }
            });
    }
}

/// One Sutherland–Hodgman pass. `output` is cleared first.
fn clip_against<V: Interpolatable>(
    input: &[ClipVertex<V>],
    output: &mut Vec<ClipVertex<V>>,
    distance: fn(&Vector4<f32>) -> f32,
) {
    output.clear();
    let Some(&last) = input.last() else {
        return;
    };

    let mut prev = last;
    let mut prev_d = distance(&prev.0);
    for &curr in input {
        let curr_d = distance(&curr.0);
        if (prev_d >= 0.0) != (curr_d >= 0.0) {
            let t = prev_d / (prev_d - curr_d);
            output.push((
                prev.0 + (curr.0 - prev.0) * t,
                prev.1 * (1.0 - t) + curr.1 * t,
            ));
        }
        if curr_d >= 0.0 {
            output.push(curr);
        }
        prev = curr;
        prev_d = curr_d;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Vertex;
    use nalgebra::Vector3;

    /// Passes clip coordinates straight through and paints a constant color.
    struct Flat(Vector3<f32>);

    impl Shader for Flat {
        type Varying = Vector3<f32>;

        fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Vector3<f32>) {
            (vertex.position.to_homogeneous(), vertex.normal)
        }

        fn fragment(&self, _varying: Vector3<f32>) -> Vector3<f32> {
            self.0
        }
    }

    fn clip(x: f32, y: f32, z: f32) -> ClipVertex<Vector3<f32>> {
        (Vector4::new(x, y, z, 1.0), Vector3::zeros())
    }

    #[test]
    fn fills_covered_pixels_and_leaves_the_rest() {
        let mut fb = FrameBuffer::new(8, 8, 1);
        fb.clear(Vector3::zeros(), 1.0);
        let red = Flat(Vector3::new(1.0, 0.0, 0.0));

        Rasterizer::new().rasterize_triangle(
            &mut fb,
            &red,
            [clip(-1.0, -1.0, 0.0), clip(1.0, -1.0, 0.0), clip(-1.0, 1.0, 0.0)],
        );

        // Lower-left half is covered, upper-right corner is not.
        assert_eq!(fb.get_pixel(0, 7), Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(fb.get_pixel(7, 0), Some(Vector3::zeros()));
        assert_eq!(fb.depth_at(0, 7), Some(0.5));
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let mut fb = FrameBuffer::new(4, 4, 1);
        fb.clear(Vector3::zeros(), 1.0);
        let full = |z| [clip(-3.0, -3.0, z), clip(3.0, -3.0, z), clip(0.0, 3.0, z)];

        let r = Rasterizer::new();
        r.rasterize_triangle(&mut fb, &Flat(Vector3::new(0.0, 1.0, 0.0)), full(-0.5));
        r.rasterize_triangle(&mut fb, &Flat(Vector3::new(0.0, 0.0, 1.0)), full(0.5));

        assert_eq!(fb.get_pixel(2, 2), Some(Vector3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn triangle_behind_the_far_plane_is_discarded() {
        let mut fb = FrameBuffer::new(4, 4, 1);
        fb.clear(Vector3::zeros(), 1.0);
        Rasterizer::new().rasterize_triangle(
            &mut fb,
            &Flat(Vector3::new(1.0, 1.0, 1.0)),
            [clip(-3.0, -3.0, 2.0), clip(3.0, -3.0, 2.0), clip(0.0, 3.0, 2.0)],
        );
        assert_eq!(fb.get_pixel(2, 2), Some(Vector3::zeros()));
    }

    #[test]
    fn clipping_a_corner_yields_a_quad() {
        let input = [clip(0.0, 0.0, -2.0), clip(1.0, 0.0, 0.0), clip(0.0, 1.0, 0.0)];
        let mut out = Vec::new();
        clip_against(&input, &mut out, CLIP_PLANES[1]);
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|(p, _)| p.z + p.w >= -1e-6));
    }
}
