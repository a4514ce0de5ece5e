use cleave_core::traits::Validate;
use cleave_core::{CleaveError, Result};
use cleave_math::{Aabb3, Point3, Transform, Vector3};
use serde::{Deserialize, Serialize};

/// Position array plus an optional triangle index array.
///
/// Without indices the positions are read as a triangle soup, three per
/// triangle. Buffers produced by cutting are always indexed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryBuffer {
    pub positions: Vec<Point3>,
    pub normals: Vec<Vector3>,
    pub indices: Option<Vec<u32>>,
}

impl GeometryBuffer {
    /// Create an indexed buffer without normals.
    pub fn new(positions: Vec<Point3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices: Some(indices),
        }
    }

    /// Create a non-indexed buffer where every three positions form a triangle.
    pub fn from_soup(positions: Vec<Point3>) -> Self {
        Self {
            positions,
            normals: Vec::new(),
            indices: None,
        }
    }

    /// Number of vertices in the buffer.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the buffer.
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.positions.len() / 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Vertex indices of triangle `t`.
    pub fn triangle(&self, t: usize) -> [u32; 3] {
        match &self.indices {
            Some(indices) => [indices[3 * t], indices[3 * t + 1], indices[3 * t + 2]],
            None => {
                let base = (3 * t) as u32;
                [base, base + 1, base + 2]
            }
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| self.triangle(t))
    }

    /// Corner positions of triangle `t`.
    pub fn triangle_positions(&self, t: usize) -> [Point3; 3] {
        let [a, b, c] = self.triangle(t);
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Merge another buffer into this one, offsetting indices appropriately.
    ///
    /// The result is always indexed. Normals survive only if both sides carry them.
    pub fn merge(&mut self, other: &GeometryBuffer) {
        let keep_normals = self.normals.len() == self.positions.len()
            && other.normals.len() == other.positions.len();

        let offset = self.positions.len() as u32;
        let mut indices: Vec<u32> = self.triangles().flatten().collect();
        indices.extend(other.triangles().flatten().map(|i| i + offset));

        self.positions.extend_from_slice(&other.positions);
        if keep_normals {
            self.normals.extend_from_slice(&other.normals);
        } else {
            self.normals.clear();
        }
        self.indices = Some(indices);
    }

    /// Compute vertex normals by accumulating adjacent face normals.
    ///
    /// Face normals are area weighted (unnormalized cross products), so large
    /// faces dominate the shading of shared vertices.
    pub fn compute_normals(&mut self) {
        let n = self.positions.len();
        let mut normals = vec![Vector3::ZERO; n];

        for tri in self.triangles() {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let p1 = self.positions[i1];
            let p2 = self.positions[i2];
            let normal = (p1 - p0).cross(p2 - p0);
            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }

        for n in &mut normals {
            let len = n.length();
            if len > 1e-12 {
                *n /= len;
            }
        }
        self.normals = normals;
    }

    /// Drop vertices no triangle references, renumbering the rest in first-use order.
    pub fn compact(&mut self) {
        let mut remap = vec![u32::MAX; self.positions.len()];
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);

        for tri in self.triangles() {
            for i in tri {
                let slot = &mut remap[i as usize];
                if *slot == u32::MAX {
                    *slot = positions.len() as u32;
                    positions.push(self.positions[i as usize]);
                }
                indices.push(*slot);
            }
        }

        self.positions = positions;
        self.normals.clear();
        self.indices = Some(indices);
    }

    /// A copy with every position mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> GeometryBuffer {
        GeometryBuffer {
            positions: self
                .positions
                .iter()
                .map(|&p| transform.transform_point(p))
                .collect(),
            normals: self
                .normals
                .iter()
                .map(|&n| transform.transform_vector(n))
                .collect(),
            indices: self.indices.clone(),
        }
    }

    /// Axis-aligned bounding box of all positions, `None` for an empty buffer.
    pub fn bounding_box(&self) -> Option<Aabb3> {
        Aabb3::from_points(&self.positions)
    }
}

impl Validate for GeometryBuffer {
    fn validate(&self) -> Result<()> {
        match &self.indices {
            Some(indices) => {
                if indices.len() % 3 != 0 {
                    return Err(CleaveError::MalformedIndexBuffer(indices.len()));
                }
                let vertex_count = self.positions.len();
                if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(CleaveError::InconsistentIndex {
                        index,
                        vertex_count,
                    });
                }
            }
            None => {
                if self.positions.len() % 3 != 0 {
                    return Err(CleaveError::MalformedIndexBuffer(self.positions.len()));
                }
            }
        }
        Ok(())
    }
}
