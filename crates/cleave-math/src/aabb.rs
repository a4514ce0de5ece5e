use crate::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-Aligned Bounding Box in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb3 {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb3 {
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let mut min = first;
        let mut max = first;
        for &p in rest {
            min = min.min(p);
            max = max.max(p);
        }
        Some(Self { min, max })
    }

    pub fn extents(&self) -> Vector3 {
        self.max - self.min
    }

    /// Length of the box diagonal; the characteristic size used to scale tolerances.
    pub fn diagonal(&self) -> f64 {
        self.extents().length()
    }
}
