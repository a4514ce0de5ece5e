//! Closed shared-vertex meshes for tests and demos.

use std::f64::consts::TAU;

use cleave_math::{Point3, Vector3};

use crate::GeometryBuffer;

/// Axis-aligned box with outward counter-clockwise winding: 8 vertices, 12 triangles.
///
/// Vertex `i` sits at `center ± half_extents`, with bit 0 of `i` selecting +x,
/// bit 1 +y and bit 2 +z.
pub fn cuboid(center: Point3, half_extents: Vector3) -> GeometryBuffer {
    let positions = (0..8u32)
        .map(|i| {
            let sign = |bit: u32| if i & (1 << bit) != 0 { 1.0 } else { -1.0 };
            center + half_extents * Vector3::new(sign(0), sign(1), sign(2))
        })
        .collect();

    #[rustfmt::skip]
    let indices = vec![
        0, 4, 6,  0, 6, 2, // -x
        1, 3, 7,  1, 7, 5, // +x
        0, 1, 5,  0, 5, 4, // -y
        2, 6, 7,  2, 7, 3, // +y
        0, 2, 3,  0, 3, 1, // -z
        4, 5, 7,  4, 7, 6, // +z
    ];

    GeometryBuffer::new(positions, indices)
}

/// Torus around the Z axis, centered at the origin.
///
/// Generates a `major_segments * minor_segments` grid that wraps in both
/// directions, connected by `2 * major_segments * minor_segments` triangles.
/// Minor ring `j` sits at angle `TAU * j / minor_segments` measured from the
/// outer equator, so with an even `minor_segments` the equator rings lie
/// exactly in the XY plane.
pub fn torus(
    major_radius: f64,
    minor_radius: f64,
    major_segments: usize,
    minor_segments: usize,
) -> GeometryBuffer {
    let major_segments = major_segments.max(3);
    let minor_segments = minor_segments.max(3);

    let mut positions = Vec::with_capacity(major_segments * minor_segments);
    for i in 0..major_segments {
        let u = TAU * i as f64 / major_segments as f64;
        let radial = Vector3::new(u.cos(), u.sin(), 0.0);
        for j in 0..minor_segments {
            let v = TAU * j as f64 / minor_segments as f64;
            // Snap the equator rings so they are exactly planar.
            let (sin_v, cos_v) = if 2 * j == minor_segments {
                (0.0, -1.0)
            } else if j == 0 {
                (0.0, 1.0)
            } else {
                v.sin_cos()
            };
            positions.push(
                radial * (major_radius + minor_radius * cos_v) + Vector3::Z * (minor_radius * sin_v),
            );
        }
    }

    let idx = |i: usize, j: usize| -> u32 {
        ((i % major_segments) * minor_segments + (j % minor_segments)) as u32
    };

    let mut indices = Vec::with_capacity(major_segments * minor_segments * 6);
    for i in 0..major_segments {
        for j in 0..minor_segments {
            let (a, b, c, d) = (idx(i, j), idx(i + 1, j), idx(i + 1, j + 1), idx(i, j + 1));
            indices.extend([a, b, c, a, c, d]);
        }
    }

    GeometryBuffer::new(positions, indices)
}
