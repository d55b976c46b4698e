use log::warn;
use nalgebra::{Point3, Vector3};
use std::collections::HashMap;

/// One corner of a face: a position plus optional texcoord / normal references.
/// All indices are 0-based and already resolved against the arrays they point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: u32,
    pub texcoord: Option<u32>,
    pub normal: Option<u32>,
}

impl FaceCorner {
    pub fn new(position: u32) -> Self {
        Self {
            position,
            texcoord: None,
            normal: None,
        }
    }
}

/// An accepted polygon: always 3 or 4 corners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Face {
    pub corners: Vec<FaceCorner>,
}

impl Face {
    /// Triangle decomposition: `(0,1,2)` for a triangle, `(0,1,2), (0,2,3)` for a quad.
    /// Winding is preserved.
    pub fn triangles(&self) -> impl Iterator<Item = [FaceCorner; 3]> + '_ {
        let c = &self.corners;
        (1..c.len().saturating_sub(1)).map(move |i| [c[0], c[i], c[i + 1]])
    }

    /// Position indices of the triangulated face, three per triangle.
    pub fn triangle_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.triangles().flat_map(|t| t.map(|c| c.position))
    }
}

/// Flat attribute arrays plus the raw faces they were referenced from.
///
/// `positions` and `normals` hold 3 floats per element, `texcoords` 2. The three index
/// spaces are independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub texcoords: Vec<f32>,
    pub faces: Vec<Face>,
}

impl VertexData {
    pub fn position_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn normal_count(&self) -> usize {
        self.normals.len() / 3
    }

    pub fn texcoord_count(&self) -> usize {
        self.texcoords.len() / 2
    }

    fn position(&self, index: usize) -> Point3<f32> {
        Point3::new(
            self.positions[index * 3],
            self.positions[index * 3 + 1],
            self.positions[index * 3 + 2],
        )
    }

    /// One normal per position, for backends that index both attributes with the same
    /// position index.
    ///
    /// Where face corners reference normals, the normals landing on a position are
    /// averaged. Positions with no reference, or whose references cancel out, get an
    /// area-weighted smooth normal computed from the faces.
    pub fn vertex_normals(&self) -> Vec<f32> {
        let mut sums: Vec<Option<Vector3<f32>>> = vec![None; self.position_count()];
        for corner in self.faces.iter().flat_map(|f| f.corners.iter()) {
            if let Some(n) = corner.normal {
                let n = n as usize;
                let normal = Vector3::new(
                    self.normals[n * 3],
                    self.normals[n * 3 + 1],
                    self.normals[n * 3 + 2],
                );
                let slot = &mut sums[corner.position as usize];
                *slot = Some(slot.unwrap_or_else(Vector3::zeros) + normal);
            }
        }

        let assigned: Vec<Option<Vector3<f32>>> = sums
            .into_iter()
            .map(|sum| sum.and_then(|n| n.try_normalize(1e-12)))
            .collect();

        let missing = assigned.iter().filter(|n| n.is_none()).count();
        let smooth = if missing > 0 {
            if !self.normals.is_empty() {
                warn!("{missing} positions have no usable normal reference, computing smooth normals");
            }
            self.smooth_normals()
        } else {
            Vec::new()
        };

        assigned
            .iter()
            .enumerate()
            .flat_map(|(i, n)| {
                let n = n.unwrap_or_else(|| smooth[i]);
                [n.x, n.y, n.z]
            })
            .collect()
    }

    /// Sum of (unnormalized) triangle normals around each position, normalized.
    fn smooth_normals(&self) -> Vec<Vector3<f32>> {
        let mut acc = vec![Vector3::zeros(); self.position_count()];
        for tri in self.faces.iter().flat_map(|f| f.triangles()) {
            let [a, b, c] = tri.map(|corner| corner.position as usize);
            let (pa, pb, pc) = (self.position(a), self.position(b), self.position(c));
            // Cross product length is twice the area, which gives the weighting.
            let n = (pb - pa).cross(&(pc - pa));
            acc[a] += n;
            acc[b] += n;
            acc[c] += n;
        }
        acc.into_iter()
            .map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::zeros))
            .collect()
    }
}

/// Result of the geometry-only load path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub data: VertexData,
    /// Triangulated position indices, three per triangle.
    pub indices: Vec<u32>,
}

impl ObjMesh {
    /// Wraps the mesh as a single group with no material, so it can go through the
    /// material-grouped render loop.
    pub fn into_grouped(self) -> GroupedMesh {
        let mut groups = MaterialGroups::default();
        groups.extend(None, self.indices);
        GroupedMesh {
            data: self.data,
            groups,
        }
    }
}

/// Triangles that share the active material at parse time.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialGroup {
    /// `None` for faces that appeared before any `usemtl`.
    pub material: Option<String>,
    /// Position indices, three per triangle.
    pub indices: Vec<u32>,
}

impl MaterialGroup {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Material name -> triangle index list, iterated in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MaterialGroups {
    groups: Vec<MaterialGroup>,
    named: HashMap<String, usize>,
    unset: Option<usize>,
}

impl PartialEq for MaterialGroups {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl MaterialGroups {
    fn slot(&self, material: Option<&str>) -> Option<usize> {
        match material {
            Some(name) => self.named.get(name).copied(),
            None => self.unset,
        }
    }

    /// Appends indices to the bucket for `material`, creating it on first use.
    pub fn extend(&mut self, material: Option<&str>, indices: impl IntoIterator<Item = u32>) {
        let slot = match self.slot(material) {
            Some(slot) => slot,
            None => {
                let slot = self.groups.len();
                self.groups.push(MaterialGroup {
                    material: material.map(str::to_owned),
                    indices: Vec::new(),
                });
                match material {
                    Some(name) => {
                        self.named.insert(name.to_owned(), slot);
                    }
                    None => self.unset = Some(slot),
                }
                slot
            }
        };
        self.groups[slot].indices.extend(indices);
    }

    pub fn get(&self, material: Option<&str>) -> Option<&[u32]> {
        self.slot(material)
            .map(|slot| self.groups[slot].indices.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn index_count(&self) -> usize {
        self.groups.iter().map(|g| g.indices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.index_count() / 3
    }
}

/// Result of the material-grouped load path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedMesh {
    pub data: VertexData,
    pub groups: MaterialGroups,
}
