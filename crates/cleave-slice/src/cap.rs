//! Cross-section cap reconstruction.
//!
//! The boundary edges left by the splitter form closed loops in the cut
//! plane. Loops are walked out of the edge graph, nested into outer
//! boundaries and holes, and every outer boundary is triangulated together
//! with its holes.

use std::collections::{BTreeMap, BTreeSet};

use cleave_core::{CleaveError, Result};
use cleave_math::{Plane, Point2, Point3};
use cleave_mesh::{triangulate_polygon, GeometryBuffer};

use crate::nesting::Nesting;
use crate::split::EdgeKey;

/// Undirected graph of boundary edges in the cut plane.
#[derive(Debug, Clone, Default)]
pub struct BoundaryGraph {
    adjacency: BTreeMap<u32, Vec<u32>>,
    edges: BTreeSet<EdgeKey>,
}

impl BoundaryGraph {
    /// Build the graph, rejecting vertices that cannot lie on closed loops.
    pub fn new(edges: impl IntoIterator<Item = EdgeKey>) -> Result<Self> {
        let mut graph = BoundaryGraph::default();
        for key in edges {
            if key.lo() == key.hi() || !graph.edges.insert(key) {
                continue;
            }
            graph.adjacency.entry(key.lo()).or_default().push(key.hi());
            graph.adjacency.entry(key.hi()).or_default().push(key.lo());
        }

        if let Some((v, neighbors)) = graph.adjacency.iter().find(|(_, n)| n.len() % 2 == 1) {
            return Err(CleaveError::malformed_boundary(format!(
                "cut vertex {} has {} boundary edges; the cut does not close",
                v,
                neighbors.len()
            )));
        }
        Ok(graph)
    }

    /// Extract every closed loop as an ordered vertex cycle.
    ///
    /// Each edge is used exactly once. A walk that revisits a vertex splits
    /// off the sub-cycle it closed, so every returned loop is simple.
    pub fn loops(&self) -> Result<Vec<Vec<u32>>> {
        let mut unused = self.edges.clone();
        let mut loops = Vec::new();
        let max_steps = self.edges.len() + 1;

        while let Some(&first) = unused.iter().next() {
            let start = first.lo();
            let mut path = vec![start];
            let mut position: BTreeMap<u32, usize> = BTreeMap::from([(start, 0)]);
            let mut current = start;
            let mut steps = 0;

            loop {
                steps += 1;
                if steps > max_steps {
                    return Err(CleaveError::malformed_boundary(format!(
                        "walk from vertex {} exceeded {} steps",
                        start, max_steps
                    )));
                }

                let next = self.adjacency[&current]
                    .iter()
                    .copied()
                    .find(|&n| unused.contains(&EdgeKey::new(current, n)))
                    .ok_or_else(|| {
                        CleaveError::malformed_boundary(format!(
                            "open chain stops at vertex {}",
                            current
                        ))
                    })?;
                unused.remove(&EdgeKey::new(current, next));

                if let Some(&at) = position.get(&next) {
                    let cycle = path.split_off(at + 1);
                    let mut closed = vec![next];
                    closed.extend(cycle);
                    for v in &closed[1..] {
                        position.remove(v);
                    }
                    loops.push(closed);
                    if next == start && path.len() == 1 {
                        break;
                    }
                    current = next;
                    continue;
                }

                position.insert(next, path.len());
                path.push(next);
                current = next;
            }
        }

        Ok(loops)
    }
}

/// Triangulated cross-section of one half.
#[derive(Debug, Clone, Default)]
pub struct Cap {
    pub buffer: GeometryBuffer,
    pub loop_count: usize,
    pub hole_count: usize,
}

/// Close the boundary loops of one half with planar triangles.
///
/// `positions` resolves the vertex indices in `boundary`. The cap faces
/// against `plane`'s normal, which is the outward direction for a half kept
/// on the positive side. Cap vertices reuse the exact loop positions, so the
/// cap welds onto the side surface without seams.
pub fn build_cap(
    boundary: impl IntoIterator<Item = EdgeKey>,
    positions: &[Point3],
    plane: &Plane,
) -> Result<Cap> {
    let graph = BoundaryGraph::new(boundary)?;
    let loops = graph.loops()?;
    if loops.is_empty() {
        return Ok(Cap::default());
    }

    let frame = plane.frame();
    let rings: Vec<Vec<Point2>> = loops
        .iter()
        .map(|l| l.iter().map(|&v| frame.to_local(positions[v as usize])).collect())
        .collect();
    let nesting = Nesting::new(&rings);

    let mut cap_positions = Vec::new();
    let mut indices = Vec::new();
    for root in nesting.roots() {
        let holes: Vec<usize> = nesting.holes_of(root).collect();
        let hole_rings: Vec<Vec<Point2>> = holes.iter().map(|&h| rings[h].clone()).collect();
        let triangles = triangulate_polygon(&rings[root], &hole_rings)?;

        let base = cap_positions.len() as u32;
        for &ring in std::iter::once(&root).chain(&holes) {
            cap_positions.extend(loops[ring].iter().map(|&v| positions[v as usize]));
        }
        // Counter-clockwise in the frame faces +normal; reverse to face -normal.
        for [a, b, c] in triangles {
            indices.extend([base + a as u32, base + c as u32, base + b as u32]);
        }
    }

    Ok(Cap {
        buffer: GeometryBuffer::new(cap_positions, indices),
        loop_count: loops.len(),
        hole_count: nesting.hole_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cleave_math::DVec3;

    fn ring_edges(vertices: &[u32]) -> Vec<EdgeKey> {
        (0..vertices.len())
            .map(|i| EdgeKey::new(vertices[i], vertices[(i + 1) % vertices.len()]))
            .collect()
    }

    fn square_positions(z: f64, half: f64) -> Vec<Point3> {
        vec![
            DVec3::new(-half, -half, z),
            DVec3::new(half, -half, z),
            DVec3::new(half, half, z),
            DVec3::new(-half, half, z),
        ]
    }

    #[test]
    fn test_single_loop() {
        let graph = BoundaryGraph::new(ring_edges(&[4, 9, 2, 7])).unwrap();
        let loops = graph.loops().unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert_eq!(loops[0][0], 2);
    }

    #[test]
    fn test_two_loops() {
        let mut edges = ring_edges(&[0, 1, 2]);
        edges.extend(ring_edges(&[10, 11, 12, 13]));
        let loops = BoundaryGraph::new(edges).unwrap().loops().unwrap();
        assert_eq!(loops.len(), 2);
        assert_eq!(loops[0].len() + loops[1].len(), 7);
    }

    #[test]
    fn test_figure_eight_splits_into_simple_loops() {
        // Two triangles sharing vertex 0.
        let mut edges = ring_edges(&[0, 1, 2]);
        edges.extend(ring_edges(&[0, 3, 4]));
        let graph = BoundaryGraph::new(edges).unwrap();
        let loops = graph.loops().unwrap();
        assert_eq!(loops.len(), 2);
        for l in &loops {
            assert_eq!(l.len(), 3);
            assert!(l.contains(&0));
        }
    }

    #[test]
    fn test_open_chain_is_malformed() {
        let edges = vec![EdgeKey::new(0, 1), EdgeKey::new(1, 2)];
        assert!(matches!(
            BoundaryGraph::new(edges),
            Err(CleaveError::MalformedBoundary { .. })
        ));
    }

    #[test]
    fn test_cap_faces_against_normal() {
        let positions = square_positions(0.0, 0.5);
        let cap = build_cap(ring_edges(&[0, 1, 2, 3]), &positions, &Plane::xy()).unwrap();
        assert_eq!(cap.loop_count, 1);
        assert_eq!(cap.hole_count, 0);
        assert_eq!(cap.buffer.triangle_count(), 2);
        assert_relative_eq!(cap.buffer.surface_area(), 1.0, epsilon = 1e-12);

        for t in 0..cap.buffer.triangle_count() {
            let [a, b, c] = cap.buffer.triangle_positions(t);
            assert!((b - a).cross(c - a).z < 0.0);
        }
    }

    #[test]
    fn test_cap_with_hole() {
        let mut positions = square_positions(1.0, 2.0);
        positions.extend(square_positions(1.0, 1.0));
        let mut edges = ring_edges(&[0, 1, 2, 3]);
        edges.extend(ring_edges(&[4, 5, 6, 7]));
        let plane = Plane::new(DVec3::Z, -1.0).unwrap();

        let cap = build_cap(edges, &positions, &plane).unwrap();
        assert_eq!(cap.loop_count, 2);
        assert_eq!(cap.hole_count, 1);
        assert_eq!(cap.buffer.vertex_count(), 8);
        assert_relative_eq!(cap.buffer.surface_area(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_boundary_gives_empty_cap() {
        let cap = build_cap(Vec::new(), &[], &Plane::xy()).unwrap();
        assert_eq!(cap.loop_count, 0);
        assert!(cap.buffer.is_empty());
    }
}
