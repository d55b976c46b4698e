use crate::core::color::pack_argb;
use nalgebra::Vector3;
use rayon::prelude::*;

/// Color + depth target, stored at `sample_count`² the output resolution (SSAA).
///
/// Storage is plain row-major `Vec`s; the rasterizer hands out disjoint rows to rayon
/// workers through [`FrameBuffer::rows_mut`], so no locking is needed.
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub sample_count: usize,
    pub buffer_width: usize,
    pub buffer_height: usize,
    color: Vec<Vector3<f32>>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize, sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        let buffer_width = width * sample_count;
        let buffer_height = height * sample_count;
        let size = buffer_width * buffer_height;

        Self {
            width,
            height,
            sample_count,
            buffer_width,
            buffer_height,
            color: vec![Vector3::zeros(); size],
            depth: vec![1.0; size],
        }
    }

    /// Fills every sample with `color` and resets depth to `depth`.
    pub fn clear(&mut self, color: Vector3<f32>, depth: f32) {
        self.color.fill(color);
        self.depth.fill(depth);
    }

    /// Parallel iterator over `(y, color_row, depth_row)` for sample rows `y0..=y1`.
    pub fn rows_mut(
        &mut self,
        y0: usize,
        y1: usize,
    ) -> impl IndexedParallelIterator<Item = (usize, &mut [Vector3<f32>], &mut [f32])> {
        let width = self.buffer_width;
        let count = y1.saturating_sub(y0) + 1;
        self.color
            .par_chunks_mut(width)
            .zip(self.depth.par_chunks_mut(width))
            .enumerate()
            .skip(y0)
            .take(count)
            .map(|(y, (color, depth))| (y, color, depth))
    }

    /// Depth of a single sample (used by tests and debugging).
    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        (x < self.buffer_width && y < self.buffer_height)
            .then(|| self.depth[y * self.buffer_width + x])
    }

    /// Averaged color of an output pixel.
    pub fn get_pixel(&self, x: usize, y: usize) -> Option<Vector3<f32>> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let s = self.sample_count;
        let mut sum = Vector3::zeros();
        for sy in y * s..(y + 1) * s {
            let row = &self.color[sy * self.buffer_width..(sy + 1) * self.buffer_width];
            for c in &row[x * s..(x + 1) * s] {
                sum += c;
            }
        }
        Some(sum / (s * s) as f32)
    }

    /// Resolves the supersampled buffer into 0RGB `u32` pixels (one per output pixel).
    pub fn resolve_into(&self, out: &mut [u32]) {
        out.par_chunks_mut(self.width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.iter_mut().enumerate() {
                    *pixel = self.get_pixel(x, y).map(pack_argb).unwrap_or(0);
                }
            });
    }
}
