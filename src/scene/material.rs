use nalgebra::Vector3;
use std::collections::HashMap;

/// Material name -> properties, as declared by `newmtl`.
pub type MaterialTable = HashMap<String, Material>;

/// Surface properties from a material library.
///
/// Every property is optional: `None` means the library never set it. Nothing here
/// substitutes defaults; that is left to whoever consumes the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    /// Specular exponent (`Ns`).
    pub shininess: Option<f32>,
    /// `Ka`
    pub ambient: Option<Vector3<f32>>,
    /// `Kd`
    pub diffuse: Option<Vector3<f32>>,
    /// `Ks`
    pub specular: Option<Vector3<f32>>,
    /// `Ke`
    pub emissive: Option<Vector3<f32>>,
    /// Index of refraction (`Ni`).
    pub optical_density: Option<f32>,
    /// Dissolve (`d`), 1.0 = opaque.
    pub opacity: Option<f32>,
    /// `illum`
    pub illumination_model: Option<u32>,
}
