//! Hierarchical cutting.
//!
//! Every leaf is sliced in its own local space and the tree is rebuilt
//! twice, once per side, from the surviving fragments. Fragments keep the
//! id, name and local transform of the node they came from.

use std::collections::HashMap;

use cleave_core::traits::Validate;
use cleave_core::{CleaveError, NodeId, Result};
use cleave_math::Plane;
use cleave_mesh::GeometryBuffer;
use cleave_slice::{slice_report, Half, SliceOptions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::node::{HierarchyNode, NodeContent};

/// Per-node plane offsets, see [`Half::oriented`]. Nodes without an entry
/// use the gap of the [`SliceOptions`] passed to the cut.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CutGaps {
    gaps: HashMap<NodeId, f64>,
}

impl CutGaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: NodeId, gap: f64) {
        self.gaps.insert(id, gap);
    }

    pub fn with(mut self, id: NodeId, gap: f64) -> Self {
        self.insert(id, gap);
        self
    }

    pub fn get(&self, id: NodeId) -> Option<f64> {
        self.gaps.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }
}

type Fragments = (Option<HierarchyNode>, Option<HierarchyNode>);

/// Cut a hierarchy by a plane given in the space `root.transform` maps into.
///
/// Returns the positive-side and negative-side hierarchies; a side with no
/// surviving leaf is `None`.
pub fn slice_hierarchy(root: &HierarchyNode, plane: &Plane) -> Result<Fragments> {
    slice_hierarchy_with(root, plane, &CutGaps::default(), &SliceOptions::default())
}

pub fn slice_hierarchy_with(
    root: &HierarchyNode,
    plane: &Plane,
    gaps: &CutGaps,
    options: &SliceOptions,
) -> Result<Fragments> {
    plane.validate()?;
    root.validate()?;
    cut_node(root, plane, gaps, options)
}

fn cut_node(
    node: &HierarchyNode,
    parent_plane: &Plane,
    gaps: &CutGaps,
    options: &SliceOptions,
) -> Result<Fragments> {
    let plane = parent_plane.to_local(&node.transform);

    match &node.content {
        NodeContent::Leaf(geometry) => cut_leaf(node, geometry, &plane, gaps, options),
        NodeContent::Group(children) => {
            let cut_child = |child: &HierarchyNode| cut_node(child, &plane, gaps, options);
            let fragments: Vec<Fragments> = if options.parallel {
                children.par_iter().map(cut_child).collect::<Result<_>>()?
            } else {
                children.iter().map(cut_child).collect::<Result<_>>()?
            };

            let (positive, negative): (Vec<_>, Vec<_>) = fragments.into_iter().unzip();
            let regroup = |kept: Vec<Option<HierarchyNode>>| {
                let kept: Vec<HierarchyNode> = kept.into_iter().flatten().collect();
                (!kept.is_empty()).then(|| node.with_content(NodeContent::Group(kept)))
            };
            Ok((regroup(positive), regroup(negative)))
        }
    }
}

fn cut_leaf(
    node: &HierarchyNode,
    geometry: &GeometryBuffer,
    plane: &Plane,
    gaps: &CutGaps,
    options: &SliceOptions,
) -> Result<Fragments> {
    let options = options.with_gap(gaps.get(node.id).unwrap_or(options.gap));
    let fragment = |half: Option<GeometryBuffer>| {
        half.map(|mesh| node.with_content(NodeContent::Leaf(mesh)))
    };

    match slice_report(geometry, plane, &options) {
        Ok((positive, negative)) => Ok((fragment(positive.mesh), fragment(negative.mesh))),
        Err(err @ (CleaveError::MalformedBoundary { .. } | CleaveError::Triangulation(_))) => {
            let Some(centroid) = geometry.centroid() else {
                return Ok((None, None));
            };
            let side = Half::of_distance(plane.signed_distance(centroid));
            log::warn!(
                "keeping node {} ({}) whole on the {:?} side: {}",
                node.name,
                node.id,
                side,
                err
            );
            Ok(match side {
                Half::Positive => (Some(node.clone()), None),
                Half::Negative => (None, Some(node.clone())),
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleave_math::{DVec3, Transform};
    use cleave_mesh::primitives::cuboid;

    #[test]
    fn test_cut_gaps_lookup() {
        let id = NodeId::new();
        let gaps = CutGaps::new().with(id, 0.25);
        assert_eq!(gaps.get(id), Some(0.25));
        assert_eq!(gaps.get(NodeId::new()), None);
        assert_eq!(gaps.len(), 1);
        assert!(CutGaps::default().is_empty());
    }

    #[test]
    fn test_leaf_root_is_split() {
        let leaf = HierarchyNode::leaf("cube", Transform::identity(), cuboid(DVec3::ZERO, DVec3::splat(0.5)));
        let (pos, neg) = slice_hierarchy(&leaf, &Plane::yz()).unwrap();
        let (pos, neg) = (pos.unwrap(), neg.unwrap());
        assert_eq!(pos.id, leaf.id);
        assert_eq!(neg.id, leaf.id);
        assert_eq!(pos.name, "cube");
        assert!(pos.is_leaf() && neg.is_leaf());
    }

    #[test]
    fn test_empty_leaf_and_group() {
        let leaf = HierarchyNode::leaf("nothing", Transform::identity(), GeometryBuffer::default());
        assert_eq!(slice_hierarchy(&leaf, &Plane::xy()).unwrap(), (None, None));

        let group = HierarchyNode::group("nobody", Transform::identity(), vec![leaf]);
        assert_eq!(slice_hierarchy(&group, &Plane::xy()).unwrap(), (None, None));
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let children = (0..6)
            .map(|i| {
                HierarchyNode::leaf(
                    format!("box{}", i),
                    Transform::from_translation(DVec3::new(i as f64 - 2.5, 0.0, 0.0)),
                    cuboid(DVec3::ZERO, DVec3::splat(0.4)),
                )
            })
            .collect();
        let root = HierarchyNode::group("row", Transform::identity(), children);
        let plane = Plane::new(DVec3::new(1.0, 0.3, 0.0), -0.1).unwrap();

        let parallel = slice_hierarchy_with(&root, &plane, &CutGaps::default(), &SliceOptions::default()).unwrap();
        let sequential = slice_hierarchy_with(
            &root,
            &plane,
            &CutGaps::default(),
            &SliceOptions::default().sequential(),
        )
        .unwrap();
        assert_eq!(parallel, sequential);
    }
}
