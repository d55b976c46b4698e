use nalgebra::{Point2, Vector3};

const EPSILON: f32 = 1e-6;

/// Twice the signed area of triangle (a, b, p).
/// Positive when `p` lies to the left of `a -> b` in screen space (Y down).
#[inline(always)]
pub fn edge_function(a: Point2<f32>, b: Point2<f32>, p: Point2<f32>) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Screen-space barycentric weights of `p` in triangle `(v0, v1, v2)`.
///
/// Works for either winding. Returns `None` for degenerate triangles.
pub fn barycentric(
    p: Point2<f32>,
    v0: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
) -> Option<Vector3<f32>> {
    let area = edge_function(v0, v1, v2);
    if area.abs() < EPSILON {
        return None;
    }
    let w0 = edge_function(v1, v2, p) / area;
    let w1 = edge_function(v2, v0, p) / area;
    Some(Vector3::new(w0, w1, 1.0 - w0 - w1))
}

/// All weights non-negative (with a small tolerance so shared edges leave no cracks).
#[inline(always)]
pub fn covers(bary: &Vector3<f32>) -> bool {
    bary.x >= -1e-5 && bary.y >= -1e-5 && bary.z >= -1e-5
}

/// Re-weights screen-space barycentrics by `1/w` so attributes interpolate linearly in
/// clip space rather than on screen.
pub fn perspective_correct(bary: &Vector3<f32>, w: [f32; 3]) -> Option<Vector3<f32>> {
    let weighted = Vector3::new(bary.x / w[0], bary.y / w[1], bary.z / w[2]);
    let sum = weighted.x + weighted.y + weighted.z;
    if sum.abs() < EPSILON {
        return None;
    }
    Some(weighted / sum)
}
