//! Edge splitting: clip every triangle against one half-space.
//!
//! Intersection vertices are computed up front, once per crossed edge, into
//! a sorted read-only table. The per-triangle pass then only looks them up,
//! so adjacent triangles share the exact same vertex and the output does not
//! depend on how the work is scheduled.

use std::collections::BTreeSet;

use cleave_math::{Plane, Point3, Side};
use rayon::prelude::*;

use crate::classify::{keeps_coplanar, PreparedMesh};

/// Unordered pair of vertex indices identifying one mesh edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    lo: u32,
    hi: u32,
}

impl EdgeKey {
    pub fn new(a: u32, b: u32) -> Self {
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    pub fn lo(self) -> u32 {
        self.lo
    }

    pub fn hi(self) -> u32 {
        self.hi
    }
}

/// Point where segment `ab` crosses `plane`.
///
/// The parameter is clamped to `[0, 1]`. A result within `epsilon` of an
/// endpoint collapses onto that endpoint.
pub fn intersect_edge(a: Point3, b: Point3, plane: &Plane, epsilon: f64) -> Point3 {
    let da = plane.signed_distance(a);
    let db = plane.signed_distance(b);
    let denom = da - db;
    if denom == 0.0 {
        return a;
    }
    let t = (da / denom).clamp(0.0, 1.0);
    let p = a + (b - a) * t;
    if p.distance_squared(a) <= epsilon * epsilon {
        a
    } else if p.distance_squared(b) <= epsilon * epsilon {
        b
    } else {
        p
    }
}

fn is_crossing(sa: Side, sb: Side) -> bool {
    matches!(
        (sa, sb),
        (Side::Positive, Side::Negative) | (Side::Negative, Side::Positive)
    )
}

/// New vertices where the plane strictly crosses mesh edges.
///
/// Vertex `k` of the table gets index `base + k`, directly after the
/// prepared mesh's own vertices.
#[derive(Debug, Clone)]
pub struct EdgeCache {
    base: u32,
    keys: Vec<EdgeKey>,
    positions: Vec<Point3>,
}

impl EdgeCache {
    pub fn build(prepared: &PreparedMesh, plane: &Plane, sides: &[Side], parallel: bool) -> Self {
        let mut keys: Vec<EdgeKey> = prepared
            .triangles
            .iter()
            .flat_map(|&[a, b, c]| [(a, b), (b, c), (c, a)])
            .filter(|&(a, b)| is_crossing(sides[a as usize], sides[b as usize]))
            .map(|(a, b)| EdgeKey::new(a, b))
            .collect();
        keys.sort_unstable();
        keys.dedup();

        // Endpoints are taken in key order so every caller computes identical bits.
        let compute = |key: &EdgeKey| {
            intersect_edge(
                prepared.positions[key.lo as usize],
                prepared.positions[key.hi as usize],
                plane,
                prepared.epsilon,
            )
        };
        let positions = if parallel {
            keys.par_iter().map(compute).collect()
        } else {
            keys.iter().map(compute).collect()
        };

        Self {
            base: prepared.positions.len() as u32,
            keys,
            positions,
        }
    }

    /// Index of the intersection vertex on `key`, if the plane crosses it.
    pub fn vertex(&self, key: EdgeKey) -> Option<u32> {
        self.keys
            .binary_search(&key)
            .ok()
            .map(|k| self.base + k as u32)
    }

    pub fn positions(&self) -> &[Point3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Retained triangles and candidate boundary edges of one clipped region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitOutput {
    pub triangles: Vec<[u32; 3]>,
    /// Edges of retained triangles whose endpoints both lie on the plane.
    pub segments: Vec<EdgeKey>,
}

impl SplitOutput {
    fn append(mut self, mut other: SplitOutput) -> SplitOutput {
        self.triangles.append(&mut other.triangles);
        self.segments.append(&mut other.segments);
        self
    }

    /// Edges reported an odd number of times, in sorted order.
    ///
    /// An on-plane edge shared by two retained triangles is interior to the
    /// retained surface and cancels out.
    pub fn boundary(&self) -> BTreeSet<EdgeKey> {
        let mut boundary = BTreeSet::new();
        for &key in &self.segments {
            if !boundary.insert(key) {
                boundary.remove(&key);
            }
        }
        boundary
    }
}

/// Clip one triangle to the non-negative side of `plane`.
///
/// Keeps the vertices not on the negative side and inserts the cached
/// intersection vertex on every strictly crossing edge, which yields a
/// triangle or a quad with the input winding. Triangles lying wholly in
/// the plane are kept only when they face away from the positive side.
pub fn split_triangle(
    tri: [u32; 3],
    sides: &[Side],
    cache: &EdgeCache,
    prepared: &PreparedMesh,
    plane: &Plane,
    out: &mut SplitOutput,
) {
    let side = tri.map(|i| sides[i as usize]);

    if side.iter().all(|&s| s == Side::OnPlane) {
        if keeps_coplanar(prepared.face_normal(tri), plane) {
            out.triangles.push(tri);
            for k in 0..3 {
                out.segments.push(EdgeKey::new(tri[k], tri[(k + 1) % 3]));
            }
        }
        return;
    }

    if side.iter().all(|&s| s != Side::Negative) {
        out.triangles.push(tri);
        for k in 0..3 {
            let j = (k + 1) % 3;
            if side[k] == Side::OnPlane && side[j] == Side::OnPlane {
                out.segments.push(EdgeKey::new(tri[k], tri[j]));
            }
        }
        return;
    }

    // (vertex, lies on the plane)
    let mut polygon: Vec<(u32, bool)> = Vec::with_capacity(4);
    for k in 0..3 {
        let j = (k + 1) % 3;
        if side[k] != Side::Negative {
            polygon.push((tri[k], side[k] == Side::OnPlane));
        }
        if is_crossing(side[k], side[j]) {
            if let Some(v) = cache.vertex(EdgeKey::new(tri[k], tri[j])) {
                polygon.push((v, true));
            }
        }
    }

    if polygon.len() < 3 {
        return;
    }

    let (p0, _) = polygon[0];
    for w in polygon[1..].windows(2) {
        out.triangles.push([p0, w[0].0, w[1].0]);
    }
    for k in 0..polygon.len() {
        let (a, a_on) = polygon[k];
        let (b, b_on) = polygon[(k + 1) % polygon.len()];
        if a_on && b_on {
            out.segments.push(EdgeKey::new(a, b));
        }
    }
}

/// Clip every triangle of `prepared`, preserving input triangle order.
pub fn split_mesh(
    prepared: &PreparedMesh,
    sides: &[Side],
    cache: &EdgeCache,
    plane: &Plane,
    parallel: bool,
) -> SplitOutput {
    let step = |mut acc: SplitOutput, tri: &[u32; 3]| {
        split_triangle(*tri, sides, cache, prepared, plane, &mut acc);
        acc
    };
    if parallel {
        prepared
            .triangles
            .par_iter()
            .fold(SplitOutput::default, step)
            .reduce(SplitOutput::default, SplitOutput::append)
    } else {
        prepared
            .triangles
            .iter()
            .fold(SplitOutput::default(), step)
    }
}
