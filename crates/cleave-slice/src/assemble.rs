use cleave_mesh::{weld, GeometryBuffer};

/// Join retained side triangles and their cap into one closed half.
///
/// Coincident vertices are welded, collapsed triangles dropped and vertex
/// normals recomputed. Returns `None` when nothing is left on this side.
pub fn assemble(retained: GeometryBuffer, cap: &GeometryBuffer, epsilon: f64) -> Option<GeometryBuffer> {
    let mut merged = retained;
    merged.merge(cap);

    let mut half = weld(&merged, epsilon);
    if half.is_empty() {
        return None;
    }
    half.compute_normals();
    Some(half)
}
