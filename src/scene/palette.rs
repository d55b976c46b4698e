use crate::scene::material::MaterialTable;
use nalgebra::Vector3;
use std::collections::HashMap;

/// Chooses the solid color each material group is drawn with.
///
/// Precedence: a per-name override, then the material's diffuse color, then `fallback`.
/// Groups without a material can only get the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub overrides: HashMap<String, Vector3<f32>>,
    pub fallback: Vector3<f32>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
            fallback: Vector3::new(0.8, 0.8, 0.8),
        }
    }
}

impl Palette {
    pub fn new(fallback: Vector3<f32>) -> Self {
        Self {
            overrides: HashMap::new(),
            fallback,
        }
    }

    pub fn with_override(mut self, name: impl Into<String>, color: Vector3<f32>) -> Self {
        self.overrides.insert(name.into(), color);
        self
    }

    pub fn resolve(&self, material: Option<&str>, table: &MaterialTable) -> Vector3<f32> {
        let Some(name) = material else {
            return self.fallback;
        };
        if let Some(color) = self.overrides.get(name) {
            return *color;
        }
        table
            .get(name)
            .and_then(|m| m.diffuse)
            .unwrap_or(self.fallback)
    }
}
