//! Transform hierarchies and cutting them by a world-space plane.

pub mod cutter;
pub mod node;

pub use cutter::{slice_hierarchy, slice_hierarchy_with, CutGaps};
pub use node::{HierarchyNode, NodeContent};
