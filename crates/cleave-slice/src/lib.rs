//! Plane slicing of closed triangle meshes.
//!
//! A mesh is cut into the part on the positive side of a plane and the part
//! on the negative side. Each part is closed again with a triangulated cap
//! across the cut, holes included.
//!
//! ```
//! use cleave_math::{DVec3, Plane};
//! use cleave_mesh::primitives::cuboid;
//!
//! let cube = cuboid(DVec3::ZERO, DVec3::splat(0.5));
//! let (right, left) = cleave_slice::slice(&cube, &Plane::yz()).unwrap();
//! assert!(right.unwrap().is_closed());
//! assert!(left.unwrap().is_closed());
//! ```

pub mod assemble;
pub mod cap;
pub mod classify;
pub mod nesting;
pub mod split;

use cleave_core::traits::Validate;
use cleave_core::{Result, Tolerance};
use cleave_math::{Plane, Side};
use cleave_mesh::GeometryBuffer;
use serde::{Deserialize, Serialize};

pub use assemble::assemble;
pub use cap::{build_cap, BoundaryGraph, Cap};
pub use classify::{classify_vertices, PreparedMesh};
pub use nesting::{point_in_polygon, Nesting};
pub use split::{intersect_edge, split_mesh, EdgeCache, EdgeKey, SplitOutput};

/// One side of a cutting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Half {
    Positive,
    Negative,
}

impl Half {
    /// The plane whose non-negative side is this half.
    ///
    /// A non-zero `gap` pushes the plane back by `gap` along its normal, so
    /// a positive gap makes the two halves overlap and a negative one
    /// separates them.
    pub fn oriented(self, plane: &Plane, gap: f64) -> Plane {
        let oriented = match self {
            Half::Positive => *plane,
            Half::Negative => plane.flipped(),
        };
        if gap == 0.0 {
            oriented
        } else {
            oriented.shifted(-gap)
        }
    }

    /// The half a point at `signed_distance` from the plane falls into.
    pub fn of_distance(signed_distance: f64) -> Self {
        if signed_distance >= 0.0 {
            Half::Positive
        } else {
            Half::Negative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliceOptions {
    pub tolerance: Tolerance,
    /// Offset applied to each half's plane, see [`Half::oriented`].
    pub gap: f64,
    /// Run the per-vertex and per-triangle passes on the rayon pool.
    pub parallel: bool,
}

impl SliceOptions {
    pub fn with_gap(self, gap: f64) -> Self {
        Self { gap, ..self }
    }

    pub fn sequential(self) -> Self {
        Self {
            parallel: false,
            ..self
        }
    }
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            gap: 0.0,
            parallel: true,
        }
    }
}

/// One sliced half together with what the cut produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HalfSlice {
    pub mesh: Option<GeometryBuffer>,
    /// The input was entirely on this side and returned unchanged.
    pub whole: bool,
    pub new_vertices: usize,
    pub loops: usize,
    pub holes: usize,
    pub cap_area: f64,
}

/// Cut `mesh` by `plane` with default options.
///
/// Returns the positive-side and negative-side halves. A side with no
/// geometry is `None`; both are `None` only for an empty mesh.
pub fn slice(
    mesh: &GeometryBuffer,
    plane: &Plane,
) -> Result<(Option<GeometryBuffer>, Option<GeometryBuffer>)> {
    slice_with(mesh, plane, &SliceOptions::default())
}

pub fn slice_with(
    mesh: &GeometryBuffer,
    plane: &Plane,
    options: &SliceOptions,
) -> Result<(Option<GeometryBuffer>, Option<GeometryBuffer>)> {
    let (positive, negative) = slice_report(mesh, plane, options)?;
    Ok((positive.mesh, negative.mesh))
}

/// Both halves with their cut statistics.
pub fn slice_report(
    mesh: &GeometryBuffer,
    plane: &Plane,
    options: &SliceOptions,
) -> Result<(HalfSlice, HalfSlice)> {
    plane.validate()?;
    let prepared = PreparedMesh::new(mesh, options.tolerance)?;

    let cut = |half| slice_prepared(mesh, &prepared, plane, half, options);
    let (positive, negative) = if options.parallel {
        rayon::join(|| cut(Half::Positive), || cut(Half::Negative))
    } else {
        (cut(Half::Positive), cut(Half::Negative))
    };
    Ok((positive?, negative?))
}

/// Cut `mesh` by `plane` and keep only one side.
pub fn slice_half(
    mesh: &GeometryBuffer,
    plane: &Plane,
    half: Half,
    options: &SliceOptions,
) -> Result<Option<GeometryBuffer>> {
    Ok(slice_half_report(mesh, plane, half, options)?.mesh)
}

pub fn slice_half_report(
    mesh: &GeometryBuffer,
    plane: &Plane,
    half: Half,
    options: &SliceOptions,
) -> Result<HalfSlice> {
    plane.validate()?;
    let prepared = PreparedMesh::new(mesh, options.tolerance)?;
    slice_prepared(mesh, &prepared, plane, half, options)
}

fn slice_prepared(
    mesh: &GeometryBuffer,
    prepared: &PreparedMesh,
    plane: &Plane,
    half: Half,
    options: &SliceOptions,
) -> Result<HalfSlice> {
    if prepared.triangles.is_empty() {
        return Ok(HalfSlice::default());
    }

    let oriented = half.oriented(plane, options.gap);
    let sides = prepared.classify(&oriented, options.parallel);

    let (mut coplanar_kept, mut coplanar_dropped) = (0usize, 0usize);
    for &tri in &prepared.triangles {
        if tri.iter().all(|&i| sides[i as usize] == Side::OnPlane) {
            if classify::keeps_coplanar(prepared.face_normal(tri), &oriented) {
                coplanar_kept += 1;
            } else {
                coplanar_dropped += 1;
            }
        }
    }

    if coplanar_dropped == 0 && !sides.contains(&Side::Negative) {
        log::debug!("{:?} half keeps the whole mesh", half);
        return Ok(HalfSlice {
            mesh: Some(mesh.clone()),
            whole: true,
            ..HalfSlice::default()
        });
    }
    if coplanar_kept == 0 && !sides.contains(&Side::Positive) {
        log::debug!("{:?} half is empty", half);
        return Ok(HalfSlice::default());
    }

    let cache = EdgeCache::build(prepared, &oriented, &sides, options.parallel);
    let split = split_mesh(prepared, &sides, &cache, &oriented, options.parallel);

    let mut positions = prepared.positions.clone();
    positions.extend_from_slice(cache.positions());
    let cap = build_cap(split.boundary(), &positions, &oriented)?;
    let cap_area = cap.buffer.surface_area();

    let retained_count = split.triangles.len();
    let retained = GeometryBuffer::new(positions, split.triangles.into_iter().flatten().collect());
    let mesh = assemble(retained, &cap.buffer, prepared.epsilon);

    log::debug!(
        "{:?} half: {} side triangles, {} new vertices, {} loops ({} holes), {} cap triangles",
        half,
        retained_count,
        cache.len(),
        cap.loop_count,
        cap.hole_count,
        cap.buffer.triangle_count()
    );

    Ok(HalfSlice {
        mesh,
        whole: false,
        new_vertices: cache.len(),
        loops: cap.loop_count,
        holes: cap.hole_count,
        cap_area,
    })
}
