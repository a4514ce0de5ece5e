//! Surface measurements used to check cut results.

use std::collections::HashMap;

use cleave_math::Point3;

use crate::GeometryBuffer;

impl GeometryBuffer {
    /// Total area of all triangles.
    pub fn surface_area(&self) -> f64 {
        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                0.5 * (b - a).cross(c - a).length()
            })
            .sum()
    }

    /// Signed enclosed volume (divergence theorem).
    ///
    /// Positive for a closed mesh with outward-facing counter-clockwise winding.
    pub fn volume(&self) -> f64 {
        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle_positions(t);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    /// Mean of all vertex positions, `None` for an empty buffer.
    pub fn centroid(&self) -> Option<Point3> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Point3 = self.positions.iter().copied().sum();
        Some(sum / self.positions.len() as f64)
    }

    /// Undirected edges not shared by exactly two triangles, with their use count.
    pub fn boundary_edges(&self) -> Vec<([u32; 2], usize)> {
        let mut counts: HashMap<[u32; 2], usize> = HashMap::new();
        for [a, b, c] in self.triangles() {
            for (p, q) in [(a, b), (b, c), (c, a)] {
                *counts.entry([p.min(q), p.max(q)]).or_default() += 1;
            }
        }
        let mut open: Vec<_> = counts.into_iter().filter(|&(_, n)| n != 2).collect();
        open.sort_unstable();
        open
    }

    /// Edge-parity scan: every edge is shared by exactly two triangles.
    pub fn is_closed(&self) -> bool {
        self.boundary_edges().is_empty()
    }

    /// Every directed edge appears once and is matched by its reverse.
    pub fn has_consistent_winding(&self) -> bool {
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for [a, b, c] in self.triangles() {
            for edge in [(a, b), (b, c), (c, a)] {
                *directed.entry(edge).or_default() += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &n)| n == 1 && directed.get(&(b, a)) == Some(&1))
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::cuboid;
    use crate::GeometryBuffer;
    use approx::assert_relative_eq;
    use cleave_math::DVec3;

    #[test]
    fn test_cube_measurements() {
        let cube = cuboid(DVec3::new(1.0, 1.0, 1.0), DVec3::new(0.5, 1.0, 1.5));
        assert_relative_eq!(cube.volume(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(cube.surface_area(), 2.0 * (2.0 + 3.0 + 6.0), epsilon = 1e-12);
        assert!((cube.centroid().unwrap() - DVec3::ONE).length() < 1e-12);
        assert!(cube.is_closed());
        assert!(cube.has_consistent_winding());
    }

    #[test]
    fn test_open_mesh_reports_boundary() {
        let triangle = GeometryBuffer::new(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]);
        assert!(!triangle.is_closed());
        assert_eq!(
            triangle.boundary_edges(),
            vec![([0, 1], 1), ([0, 2], 1), ([1, 2], 1)]
        );
        assert!(!triangle.has_consistent_winding());
    }

    #[test]
    fn test_flipped_winding_detected() {
        let mut cube = cuboid(DVec3::ZERO, DVec3::splat(0.5));
        if let Some(indices) = cube.indices.as_mut() {
            indices.swap(1, 2);
        }
        assert!(cube.is_closed());
        assert!(!cube.has_consistent_winding());
    }

    #[test]
    fn test_empty_measurements() {
        let empty = GeometryBuffer::default();
        assert_eq!(empty.surface_area(), 0.0);
        assert_eq!(empty.volume(), 0.0);
        assert!(empty.centroid().is_none());
        assert!(empty.is_closed());
    }
}
