//! Positional vertex deduplication.
//!
//! Floating-point coordinates are quantized onto a grid whose cell size is
//! the weld epsilon before they are used as map keys. A point may sit near a
//! cell border, so lookups probe the 27 cells around the query point and
//! compare true distances.

use std::collections::HashMap;

use cleave_math::Point3;

use crate::GeometryBuffer;

type CellKey = [i64; 3];

/// Incrementally assigns one index per distinct position (within `epsilon`).
#[derive(Debug, Clone)]
pub struct VertexWelder {
    epsilon: f64,
    cells: HashMap<CellKey, Vec<u32>>,
    positions: Vec<Point3>,
}

impl VertexWelder {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon: epsilon.max(f64::MIN_POSITIVE),
            cells: HashMap::new(),
            positions: Vec::new(),
        }
    }

    fn cell_of(&self, p: Point3) -> CellKey {
        let q = p / self.epsilon;
        [q.x.floor() as i64, q.y.floor() as i64, q.z.floor() as i64]
    }

    /// Index of an already inserted position within `epsilon` of `p`.
    pub fn find(&self, p: Point3) -> Option<u32> {
        let [cx, cy, cz] = self.cell_of(p);
        let limit = self.epsilon * self.epsilon;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let key = [
                        cx.saturating_add(dx),
                        cy.saturating_add(dy),
                        cz.saturating_add(dz),
                    ];
                    let Some(bucket) = self.cells.get(&key) else {
                        continue;
                    };
                    if let Some(&hit) = bucket
                        .iter()
                        .find(|&&i| self.positions[i as usize].distance_squared(p) <= limit)
                    {
                        return Some(hit);
                    }
                }
            }
        }
        None
    }

    /// Return the index of `p`, inserting it if no coincident position exists.
    pub fn insert(&mut self, p: Point3) -> u32 {
        if let Some(existing) = self.find(p) {
            return existing;
        }
        let index = self.positions.len() as u32;
        let key = self.cell_of(p);
        self.cells.entry(key).or_default().push(index);
        self.positions.push(p);
        index
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn into_positions(self) -> Vec<Point3> {
        self.positions
    }
}

/// Map every position to the index of its first coincident representative.
///
/// Returns the distinct positions and, for each input position, its new index.
pub fn weld_positions(positions: &[Point3], epsilon: f64) -> (Vec<Point3>, Vec<u32>) {
    let mut welder = VertexWelder::new(epsilon);
    let remap = positions.iter().map(|&p| welder.insert(p)).collect();
    (welder.into_positions(), remap)
}

/// Merge coincident vertices of a buffer into a shared-vertex indexed mesh.
///
/// Triangles that collapse (two corners welded together) are dropped and
/// unreferenced vertices are removed. Normals are not carried over.
pub fn weld(buffer: &GeometryBuffer, epsilon: f64) -> GeometryBuffer {
    let (positions, remap) = weld_positions(&buffer.positions, epsilon);

    let mut indices = Vec::with_capacity(buffer.triangle_count() * 3);
    for [a, b, c] in buffer.triangles() {
        let (a, b, c) = (remap[a as usize], remap[b as usize], remap[c as usize]);
        if a == b || b == c || c == a {
            continue;
        }
        indices.extend([a, b, c]);
    }

    let mut welded = GeometryBuffer::new(positions, indices);
    welded.compact();
    welded
}
