//! Containment forest of planar boundary loops.

use cleave_math::Point2;
use cleave_mesh::polygon_area;

/// Above this many loops the all-pairs containment test is reported.
const LARGE_LOOP_COUNT: usize = 256;

/// Crossing-number test with a ray cast along +x; odd crossings mean inside.
pub fn point_in_polygon(point: Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    let mut inside = false;
    let mut j = n.wrapping_sub(1);
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Loop `inner` lies inside loop `outer`.
///
/// Tested with the first vertex of `inner` that is not also a vertex of
/// `outer`, since loops of one cut may touch at shared vertices.
fn contains(outer: &[Point2], inner: &[Point2]) -> bool {
    inner
        .iter()
        .find(|p| !outer.contains(p))
        .map_or(false, |&p| point_in_polygon(p, outer))
}

/// Depth and direct container of every loop.
///
/// Loops at even depth bound solid material; loops at odd depth are holes
/// in their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nesting {
    depth: Vec<usize>,
    parent: Vec<Option<usize>>,
}

impl Nesting {
    pub fn new(loops: &[Vec<Point2>]) -> Self {
        if loops.len() > LARGE_LOOP_COUNT {
            log::warn!(
                "classifying nesting of {} cut loops pairwise; expect a slow cap",
                loops.len()
            );
        }

        let areas: Vec<f64> = loops.iter().map(|l| polygon_area(l).abs()).collect();
        let mut depth = vec![0; loops.len()];
        let mut parent = vec![None; loops.len()];

        for (i, inner) in loops.iter().enumerate() {
            let mut nearest: Option<usize> = None;
            for (j, outer) in loops.iter().enumerate() {
                if i == j || areas[j] <= areas[i] || !contains(outer, inner) {
                    continue;
                }
                depth[i] += 1;
                if nearest.map_or(true, |k| areas[j] < areas[k]) {
                    nearest = Some(j);
                }
            }
            parent[i] = nearest;
        }

        Self { depth, parent }
    }

    pub fn len(&self) -> usize {
        self.depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    pub fn is_hole(&self, index: usize) -> bool {
        self.depth[index] % 2 == 1
    }

    /// Outer boundaries, in loop order.
    pub fn roots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&i| !self.is_hole(i))
    }

    /// Holes whose nearest container is `root`.
    pub fn holes_of(&self, root: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(move |&i| self.is_hole(i) && self.parent[i] == Some(root))
    }

    /// Number of hole relations in the forest.
    pub fn hole_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_hole(i)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleave_math::DVec2;

    fn square(center: DVec2, half: f64) -> Vec<Point2> {
        vec![
            center + DVec2::new(-half, -half),
            center + DVec2::new(half, -half),
            center + DVec2::new(half, half),
            center + DVec2::new(-half, half),
        ]
    }

    #[test]
    fn test_point_in_polygon() {
        let sq = square(DVec2::ZERO, 1.0);
        assert!(point_in_polygon(DVec2::ZERO, &sq));
        assert!(point_in_polygon(DVec2::new(0.9, -0.9), &sq));
        assert!(!point_in_polygon(DVec2::new(1.5, 0.0), &sq));
        assert!(!point_in_polygon(DVec2::new(-3.0, 0.0), &sq));
        assert!(!point_in_polygon(DVec2::ZERO, &[]));
    }

    #[test]
    fn test_point_in_concave_polygon() {
        // U shape opening upwards.
        let u = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(3.0, 0.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(2.0, 3.0),
            DVec2::new(2.0, 1.0),
            DVec2::new(1.0, 1.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(0.0, 3.0),
        ];
        assert!(point_in_polygon(DVec2::new(0.5, 2.0), &u));
        assert!(!point_in_polygon(DVec2::new(1.5, 2.0), &u));
        assert!(point_in_polygon(DVec2::new(1.5, 0.5), &u));
    }

    #[test]
    fn test_annulus_has_one_hole() {
        let loops = vec![square(DVec2::ZERO, 1.0), square(DVec2::ZERO, 2.0)];
        let nesting = Nesting::new(&loops);
        assert_eq!(nesting.hole_count(), 1);
        assert!(nesting.is_hole(0));
        assert_eq!(nesting.roots().collect::<Vec<_>>(), vec![1]);
        assert_eq!(nesting.holes_of(1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_island_inside_hole_is_root() {
        let loops = vec![
            square(DVec2::ZERO, 3.0),
            square(DVec2::ZERO, 2.0),
            square(DVec2::ZERO, 1.0),
        ];
        let nesting = Nesting::new(&loops);
        assert!(!nesting.is_hole(2));
        assert_eq!(nesting.holes_of(1).count(), 0);
        assert_eq!(nesting.roots().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(nesting.holes_of(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(nesting.hole_count(), 1);
    }

    #[test]
    fn test_disjoint_loops_are_all_roots() {
        let loops = vec![
            square(DVec2::new(-5.0, 0.0), 1.0),
            square(DVec2::new(5.0, 0.0), 1.0),
        ];
        let nesting = Nesting::new(&loops);
        assert_eq!(nesting.hole_count(), 0);
        assert_eq!(nesting.roots().count(), 2);
    }

    #[test]
    fn test_loops_touching_at_a_vertex() {
        // Two squares sharing one corner, neither inside the other.
        let loops = vec![
            square(DVec2::new(-1.0, -1.0), 1.0),
            square(DVec2::new(1.0, 1.0), 1.0),
        ];
        let nesting = Nesting::new(&loops);
        assert_eq!(nesting.hole_count(), 0);
    }
}
