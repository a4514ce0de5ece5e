//! Planar polygon-with-holes triangulation.
//!
//! Ear clipping is delegated to earcutr. Earcut silently discards vertices
//! that are exactly collinear with their neighbours; a cap built from such
//! a triangulation would leave T-junctions against the cut surface, so the
//! discarded vertices are put back by splitting the triangle edge they lie on.

use cleave_core::{CleaveError, Result};
use cleave_math::Point2;

/// Relative collinearity tolerance used when re-inserting discarded vertices.
const COLLINEAR_EPS: f64 = 1e-9;

/// Twice the signed area of triangle `(a, b, c)`; positive when counter-clockwise.
pub fn orient2d(a: Point2, b: Point2, c: Point2) -> f64 {
    (b - a).perp_dot(c - a)
}

/// Signed area of a closed polygon (shoelace); positive when counter-clockwise.
pub fn polygon_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: f64 = (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum();
    0.5 * twice
}

/// Triangulate a simple polygon with holes.
///
/// Vertices are numbered outer ring first, then each hole in order. Every
/// returned triangle is counter-clockwise regardless of the input ring
/// orientation, and every input vertex that is not a duplicate of another
/// is referenced by at least one triangle.
pub fn triangulate_polygon(outer: &[Point2], holes: &[Vec<Point2>]) -> Result<Vec<[usize; 3]>> {
    if outer.len() < 3 {
        return Ok(Vec::new());
    }

    let mut points: Vec<Point2> = outer.to_vec();
    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes.iter().filter(|h| h.len() >= 3) {
        hole_indices.push(points.len());
        points.extend_from_slice(hole);
    }

    let coords: Vec<f64> = points.iter().flat_map(|p| [p.x, p.y]).collect();
    let flat = earcutr::earcut(&coords, &hole_indices, 2)
        .map_err(|_| CleaveError::Triangulation("earcut rejected the polygon".into()))?;

    if flat.is_empty() {
        let scale = polygon_scale(outer);
        if polygon_area(outer).abs() > COLLINEAR_EPS * scale * scale {
            return Err(CleaveError::Triangulation(format!(
                "no triangles produced for a polygon with {} outer and {} hole vertices",
                outer.len(),
                points.len() - outer.len()
            )));
        }
        return Ok(Vec::new());
    }

    let mut triangles: Vec<[usize; 3]> = flat.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
    orient_counter_clockwise(&points, &mut triangles);
    restore_discarded_vertices(&points, &mut triangles);
    resplit_degenerate(&points, &mut triangles);
    Ok(triangles)
}

/// Earcut winds all of its output the same way, so the orientation is read
/// from the summed area and applied to every triangle. Near-collinear ears
/// carry no usable sign of their own.
fn orient_counter_clockwise(points: &[Point2], triangles: &mut [[usize; 3]]) {
    let twice_area: f64 = triangles
        .iter()
        .map(|t| orient2d(points[t[0]], points[t[1]], points[t[2]]))
        .sum();
    if twice_area < 0.0 {
        for tri in triangles.iter_mut() {
            tri.swap(1, 2);
        }
    }
}

fn polygon_scale(points: &[Point2]) -> f64 {
    points
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(1.0, f64::max)
}

/// Split triangle edges at every vertex the triangulator dropped as collinear.
fn restore_discarded_vertices(points: &[Point2], triangles: &mut Vec<[usize; 3]>) {
    let mut used = vec![false; points.len()];
    for tri in triangles.iter() {
        for &i in tri {
            used[i] = true;
        }
    }

    for v in (0..points.len()).filter(|&v| !used[v]) {
        let p = points[v];
        let hit = triangles.iter().enumerate().find_map(|(t, tri)| {
            (0..3).find_map(|k| {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                lies_inside_segment(p, points[a], points[b]).then_some((t, k))
            })
        });

        // A vertex with no host edge duplicates another one; leave it to welding.
        let Some((t, k)) = hit else {
            continue;
        };
        let tri = triangles[t];
        let (a, b, c) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
        triangles[t] = [a, v, c];
        triangles.push([v, b, c]);
    }
}

/// Remove zero-area triangles whose middle vertex lies on the opposite edge.
///
/// The triangle sharing that long edge is split at the middle vertex
/// instead, which keeps every edge matched and the winding unchanged.
fn resplit_degenerate(points: &[Point2], triangles: &mut Vec<[usize; 3]>) {
    let mut budget = 4 * triangles.len();
    let mut t = 0;
    while t < triangles.len() && budget > 0 {
        budget -= 1;
        let tri = triangles[t];
        let middle = (0..3).find_map(|k| {
            let (m, p, q) = (tri[k], tri[(k + 1) % 3], tri[(k + 2) % 3]);
            lies_inside_segment(points[m], points[p], points[q]).then_some((m, p, q))
        });
        let Some((m, p, q)) = middle else {
            t += 1;
            continue;
        };

        // The neighbour across `p -> q` runs `q -> p`.
        let neighbour = triangles.iter().enumerate().find_map(|(n, other)| {
            (n != t)
                .then(|| (0..3).find(|&k| other[k] == q && other[(k + 1) % 3] == p))
                .flatten()
                .map(|k| (n, other[(k + 2) % 3]))
        });
        let Some((n, d)) = neighbour else {
            t += 1;
            continue;
        };

        triangles[n] = [q, m, d];
        triangles.push([m, p, d]);
        triangles.remove(t);
    }
}

/// Whether `p` lies on segment `ab`, strictly between its endpoints.
fn lies_inside_segment(p: Point2, a: Point2, b: Point2) -> bool {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return false;
    }
    if orient2d(a, b, p).abs() > COLLINEAR_EPS * len_sq {
        return false;
    }
    let t = (p - a).dot(ab) / len_sq;
    t > COLLINEAR_EPS && t < 1.0 - COLLINEAR_EPS
}
