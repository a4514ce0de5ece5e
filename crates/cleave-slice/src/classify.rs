//! Plane classification of a welded input mesh.

use cleave_core::traits::Validate;
use cleave_core::{Result, Tolerance};
use cleave_math::{Plane, Point3, Side};
use cleave_mesh::{weld_positions, GeometryBuffer};
use rayon::prelude::*;

/// Input mesh reduced to shared vertices, ready to be cut.
///
/// Coincident input vertices are merged first, so meshes whose seams carry
/// duplicated vertices still produce one intersection per physical edge.
#[derive(Debug, Clone)]
pub struct PreparedMesh {
    pub positions: Vec<Point3>,
    pub triangles: Vec<[u32; 3]>,
    /// Absolute epsilon for on-plane tests and welding, scaled to the mesh size.
    pub epsilon: f64,
}

impl PreparedMesh {
    pub fn new(mesh: &GeometryBuffer, tolerance: Tolerance) -> Result<Self> {
        mesh.validate()?;

        let extent = mesh.bounding_box().map(|b| b.diagonal()).unwrap_or(0.0);
        let epsilon = tolerance.scaled(extent);
        let (positions, remap) = weld_positions(&mesh.positions, epsilon);

        let triangles = mesh
            .triangles()
            .map(|[a, b, c]| [remap[a as usize], remap[b as usize], remap[c as usize]])
            .filter(|&[a, b, c]| a != b && b != c && c != a)
            .collect();

        Ok(Self {
            positions,
            triangles,
            epsilon,
        })
    }

    /// Side of every welded vertex relative to `plane`.
    pub fn classify(&self, plane: &Plane, parallel: bool) -> Vec<Side> {
        classify_vertices(&self.positions, plane, self.epsilon, parallel)
    }

    /// Unnormalized face normal of triangle `tri`.
    pub fn face_normal(&self, tri: [u32; 3]) -> Point3 {
        let [a, b, c] = tri.map(|i| self.positions[i as usize]);
        (b - a).cross(c - a)
    }
}

pub fn classify_vertices(positions: &[Point3], plane: &Plane, epsilon: f64, parallel: bool) -> Vec<Side> {
    if parallel {
        positions
            .par_iter()
            .map(|&p| plane.classify(p, epsilon))
            .collect()
    } else {
        positions.iter().map(|&p| plane.classify(p, epsilon)).collect()
    }
}

/// Which half a coplanar triangle belongs to: the side its face normal points away from.
pub fn keeps_coplanar(face_normal: Point3, plane: &Plane) -> bool {
    face_normal.dot(plane.normal()) < 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleave_core::CleaveError;
    use cleave_math::DVec3;
    use cleave_mesh::primitives::cuboid;

    #[test]
    fn test_prepare_welds_duplicated_seams() {
        // A cube given as a triangle soup: 36 positions, 8 distinct corners.
        let cube = cuboid(DVec3::ZERO, DVec3::splat(0.5));
        let soup = GeometryBuffer::from_soup(
            cube.triangles()
                .flatten()
                .map(|i| cube.positions[i as usize])
                .collect(),
        );
        let prepared = PreparedMesh::new(&soup, Tolerance::default()).unwrap();
        assert_eq!(prepared.positions.len(), 8);
        assert_eq!(prepared.triangles.len(), 12);
    }

    #[test]
    fn test_prepare_rejects_bad_indices() {
        let bad = GeometryBuffer::new(vec![DVec3::ZERO; 3], vec![0, 1, 7]);
        assert!(matches!(
            PreparedMesh::new(&bad, Tolerance::default()),
            Err(CleaveError::InconsistentIndex { index: 7, .. })
        ));
    }

    #[test]
    fn test_classify_is_consistent_across_modes() {
        let cube = cuboid(DVec3::ZERO, DVec3::splat(0.5));
        let prepared = PreparedMesh::new(&cube, Tolerance::default()).unwrap();
        let plane = Plane::from_point_normal(DVec3::ZERO, DVec3::new(1.0, 0.0, 0.0)).unwrap();

        let sides = prepared.classify(&plane, true);
        assert_eq!(sides, prepared.classify(&plane, false));
        assert_eq!(sides.iter().filter(|&&s| s == Side::Positive).count(), 4);
        assert_eq!(sides.iter().filter(|&&s| s == Side::Negative).count(), 4);

        let flipped = prepared.classify(&plane.flipped(), true);
        for (a, b) in sides.iter().zip(&flipped) {
            assert_eq!(*a == Side::Positive, *b == Side::Negative);
            assert_eq!(*a == Side::Negative, *b == Side::Positive);
        }
    }

    #[test]
    fn test_on_plane_band_scales_with_mesh() {
        let big = cuboid(DVec3::ZERO, DVec3::splat(5000.0));
        let prepared = PreparedMesh::new(&big, Tolerance::default()).unwrap();
        let plane = Plane::yz();
        // 1e-5 is far below the scaled band of a ten-kilometre model.
        assert_eq!(prepared.positions[0].x, -5000.0);
        assert_eq!(plane.classify(DVec3::new(1e-5, 0.0, 0.0), prepared.epsilon), Side::OnPlane);
        assert_eq!(plane.classify(DVec3::new(1e-5, 0.0, 0.0), Tolerance::DEFAULT_LINEAR), Side::Positive);
    }

    #[test]
    fn test_keeps_coplanar() {
        let plane = Plane::xy();
        assert!(keeps_coplanar(DVec3::new(0.0, 0.0, -2.0), &plane));
        assert!(!keeps_coplanar(DVec3::new(0.0, 0.0, 2.0), &plane));
        assert!(!keeps_coplanar(DVec3::ZERO, &plane));
    }
}
