use crate::core::geometry::Vertex;
use crate::core::pipeline::Shader;
use nalgebra::{Matrix4, Vector3, Vector4};

const AMBIENT: f32 = 0.3;
const KEY_WEIGHT: f32 = 0.7;
const FILL_WEIGHT: f32 = 0.3;

/// Solid-color shader with one ambient term and two fixed directional lights.
///
/// Normals are used as given (model space); the model transform only moves positions.
pub struct LitShader {
    pub mvp: Matrix4<f32>,
    pub color: Vector3<f32>,
    key_light: Vector3<f32>,
    fill_light: Vector3<f32>,
}

impl LitShader {
    pub fn new(
        projection: Matrix4<f32>,
        view: Matrix4<f32>,
        model: Matrix4<f32>,
        color: Vector3<f32>,
    ) -> Self {
        Self {
            mvp: projection * view * model,
            color,
            key_light: Vector3::new(-1.0, 1.0, 0.0).normalize(),
            fill_light: Vector3::new(-0.5, 0.8, 0.5).normalize(),
        }
    }
}

impl Shader for LitShader {
    type Varying = Vector3<f32>;

    fn vertex(&self, vertex: &Vertex) -> (Vector4<f32>, Self::Varying) {
        (self.mvp * vertex.position.to_homogeneous(), vertex.normal)
    }

    fn fragment(&self, normal: Vector3<f32>) -> Vector3<f32> {
        // Zero normals (unreferenced or degenerate) get ambient only.
        let Some(n) = normal.try_normalize(1e-12) else {
            return self.color * AMBIENT;
        };
        let key = n.dot(&self.key_light).max(0.0);
        let fill = n.dot(&self.fill_light).max(0.0);

        let lit = self.color * (AMBIENT + KEY_WEIGHT * key + FILL_WEIGHT * fill);
        lit.map(|c| c.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn shader(color: Vector3<f32>) -> LitShader {
        let id = Matrix4::identity();
        LitShader::new(id, id, id, color)
    }

    #[test]
    fn facing_away_from_both_lights_is_ambient_only() {
        let s = shader(Vector3::new(1.0, 0.5, 0.0));
        let c = s.fragment(Vector3::new(1.0, -1.0, 0.0));
        assert_relative_eq!(c, Vector3::new(0.3, 0.15, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn facing_the_key_light() {
        let s = shader(Vector3::new(0.5, 0.5, 0.5));
        let n = Vector3::new(-1.0, 1.0, 0.0);
        let fill = n.normalize().dot(&Vector3::new(-0.5, 0.8, 0.5).normalize());
        let expected = 0.5 * (0.3 + 0.7 + 0.3 * fill);
        assert_relative_eq!(s.fragment(n), Vector3::repeat(expected), epsilon = 1e-6);
    }

    #[test]
    fn bright_colors_are_clamped() {
        let s = shader(Vector3::new(1.0, 1.0, 1.0));
        let c = s.fragment(Vector3::new(-1.0, 1.0, 0.0));
        assert_eq!(c, Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn zero_normal_does_not_produce_nan() {
        let s = shader(Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(s.fragment(Vector3::zeros()), Vector3::repeat(0.3));
    }

    #[test]
    fn vertex_stage_applies_mvp_and_passes_normal() {
        let s = LitShader::new(
            Matrix4::identity(),
            Matrix4::new_translation(&Vector3::new(0.0, 0.0, -2.0)),
            Matrix4::new_scaling(2.0),
            Vector3::zeros(),
        );
        let v = Vertex::new(nalgebra::Point3::new(1.0, 0.0, 0.0), Vector3::y());
        let (clip, normal) = s.vertex(&v);
        assert_relative_eq!(clip, Vector4::new(2.0, 0.0, -2.0, 1.0));
        assert_eq!(normal, Vector3::y());
    }
}
