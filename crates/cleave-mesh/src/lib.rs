//! Indexed triangle buffers and the mesh utilities the cutter builds on.

pub mod buffer;
pub mod measure;
pub mod primitives;
pub mod triangulate;
pub mod weld;

pub use buffer::GeometryBuffer;
pub use triangulate::{orient2d, polygon_area, triangulate_polygon};
pub use weld::{weld, weld_positions, VertexWelder};
