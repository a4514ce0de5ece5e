//! Named transform hierarchy with geometry at the leaves.

use cleave_core::traits::Validate;
use cleave_core::{NodeId, Result};
use cleave_math::{Aabb3, Transform};
use cleave_mesh::GeometryBuffer;
use serde::{Deserialize, Serialize};

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeContent {
    Leaf(GeometryBuffer),
    Group(Vec<HierarchyNode>),
}

/// A node of the hierarchy, placed relative to its parent by `transform`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyNode {
    pub id: NodeId,
    pub name: String,
    pub transform: Transform,
    pub content: NodeContent,
}

impl HierarchyNode {
    /// Create a leaf node with a fresh id.
    pub fn leaf(name: impl Into<String>, transform: Transform, geometry: GeometryBuffer) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform,
            content: NodeContent::Leaf(geometry),
        }
    }

    /// Create a group node with a fresh id.
    pub fn group(name: impl Into<String>, transform: Transform, children: Vec<HierarchyNode>) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            transform,
            content: NodeContent::Group(children),
        }
    }

    /// Same id, name and transform with different content.
    pub fn with_content(&self, content: NodeContent) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            transform: self.transform,
            content,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Leaf(_))
    }

    pub fn geometry(&self) -> Option<&GeometryBuffer> {
        match &self.content {
            NodeContent::Leaf(geometry) => Some(geometry),
            NodeContent::Group(_) => None,
        }
    }

    /// Direct children; empty for a leaf.
    pub fn children(&self) -> &[HierarchyNode] {
        match &self.content {
            NodeContent::Leaf(_) => &[],
            NodeContent::Group(children) => children,
        }
    }

    /// Find a node by id (depth-first search).
    pub fn find(&self, id: NodeId) -> Option<&HierarchyNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(id))
    }

    /// Count total nodes in the subtree (including self).
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(|c| c.count()).sum::<usize>()
    }

    pub fn leaf_count(&self) -> usize {
        match &self.content {
            NodeContent::Leaf(_) => 1,
            NodeContent::Group(children) => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }

    /// All leaf geometry merged into one buffer, in the space this node's
    /// transform maps into.
    pub fn world_geometry(&self) -> GeometryBuffer {
        let mut merged = GeometryBuffer::new(Vec::new(), Vec::new());
        self.collect_geometry(&Transform::identity(), &mut merged);
        merged
    }

    fn collect_geometry(&self, parent: &Transform, out: &mut GeometryBuffer) {
        let placed = self.transform.then(parent);
        match &self.content {
            NodeContent::Leaf(geometry) => out.merge(&geometry.transformed(&placed)),
            NodeContent::Group(children) => {
                for child in children {
                    child.collect_geometry(&placed, out);
                }
            }
        }
    }

    /// Bounds of [`world_geometry`](Self::world_geometry).
    pub fn bounding_box(&self) -> Option<Aabb3> {
        self.world_geometry().bounding_box()
    }
}

impl Validate for HierarchyNode {
    fn validate(&self) -> Result<()> {
        match &self.content {
            NodeContent::Leaf(geometry) => geometry.validate(),
            NodeContent::Group(children) => children.iter().try_for_each(|c| c.validate()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cleave_core::CleaveError;
    use cleave_math::{DQuat, DVec3};
    use cleave_mesh::primitives::cuboid;

    fn unit_cube() -> GeometryBuffer {
        cuboid(DVec3::ZERO, DVec3::splat(0.5))
    }

    fn sample_tree() -> HierarchyNode {
        let left = HierarchyNode::leaf(
            "left",
            Transform::from_translation(DVec3::new(-2.0, 0.0, 0.0)),
            unit_cube(),
        );
        let right = HierarchyNode::leaf(
            "right",
            Transform::from_translation(DVec3::new(2.0, 0.0, 0.0)),
            unit_cube(),
        );
        let wing = HierarchyNode::group(
            "wing",
            Transform::from_translation(DVec3::new(0.0, 5.0, 0.0)),
            vec![right],
        );
        HierarchyNode::group("root", Transform::identity(), vec![left, wing])
    }

    #[test]
    fn test_tree_count() {
        let tree = sample_tree();
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.leaf_count(), 2);
        assert!(!tree.is_leaf());
        assert!(tree.geometry().is_none());
    }

    #[test]
    fn test_find() {
        let tree = sample_tree();
        let wing_id = tree.children()[1].id;
        let found = tree.find(wing_id).unwrap();
        assert_eq!(found.name, "wing");
        assert_eq!(found.children().len(), 1);
        assert!(tree.find(NodeId::new()).is_none());
    }

    #[test]
    fn test_world_geometry_applies_nested_transforms() {
        let tree = sample_tree();
        let world = tree.world_geometry();
        assert_eq!(world.vertex_count(), 16);
        assert_eq!(world.triangle_count(), 24);
        assert_relative_eq!(world.volume(), 2.0, epsilon = 1e-12);

        let bounds = tree.bounding_box().unwrap();
        assert!((bounds.min - DVec3::new(-2.5, -0.5, -0.5)).length() < 1e-12);
        assert!((bounds.max - DVec3::new(2.5, 5.5, 0.5)).length() < 1e-12);
    }

    #[test]
    fn test_world_geometry_rotation() {
        let bar = cuboid(DVec3::new(1.0, 0.0, 0.0), DVec3::new(1.0, 0.1, 0.1));
        let node = HierarchyNode::leaf(
            "bar",
            Transform::new(DVec3::new(0.0, 0.0, 1.0), DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2)),
            bar,
        );
        let bounds = node.bounding_box().unwrap();
        assert!((bounds.max - DVec3::new(0.1, 2.0, 1.1)).length() < 1e-9);
        assert!((bounds.min - DVec3::new(-0.1, 0.0, 0.9)).length() < 1e-9);
    }

    #[test]
    fn test_empty_group() {
        let empty = HierarchyNode::group("empty", Transform::identity(), Vec::new());
        assert_eq!(empty.leaf_count(), 0);
        assert!(empty.world_geometry().is_empty());
        assert!(empty.bounding_box().is_none());
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_validate_reaches_nested_leaves() {
        let broken = GeometryBuffer::new(vec![DVec3::ZERO], vec![0, 0, 3]);
        let tree = HierarchyNode::group(
            "root",
            Transform::identity(),
            vec![HierarchyNode::group(
                "inner",
                Transform::identity(),
                vec![HierarchyNode::leaf("bad", Transform::identity(), broken)],
            )],
        );
        assert_eq!(
            tree.validate(),
            Err(CleaveError::InconsistentIndex {
                index: 3,
                vertex_count: 1
            })
        );
    }
}
