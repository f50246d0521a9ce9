// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Instantiated node tree
//!
//! Nodes live in an arena addressed by stable indices; the resolved root is a
//! separate field so promoting a subtree never moves or aliases nodes. The
//! index space starts fresh with every tree, which keeps node identity from
//! leaking between runs.

use crate::geometry::{BooleanOp, Primitive};
use nalgebra::{Matrix4, UnitQuaternion, Vector3};

/// Stable index of a node within its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// A single node in the instantiated tree
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub root_tagged: bool,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            root_tagged: false,
        }
    }
}

/// Node variants
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Transparent grouping, including the synthetic top-level group
    Group,
    Primitive(Primitive),
    Transform(TransformOp),
    Boolean(BooleanOp),
    /// Control node: message already rendered at instantiation time
    Echo(String),
}

/// Transformation operations
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOp {
    Translate(Vector3<f64>),
    Rotate(Vector3<f64>),
    Scale(Vector3<f64>),
    Mirror(Vector3<f64>),
}

impl TransformOp {
    /// Convert transformation to a 4x4 matrix
    pub fn to_matrix(&self) -> Matrix4<f64> {
        match self {
            TransformOp::Translate(v) => Matrix4::new_translation(v),
            TransformOp::Rotate(angles) => {
                let rx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), angles.x.to_radians());
                let ry = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angles.y.to_radians());
                let rz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), angles.z.to_radians());
                (rz * ry * rx).to_homogeneous()
            }
            TransformOp::Scale(s) => Matrix4::new_nonuniform_scaling(s),
            TransformOp::Mirror(axis) => {
                let mut m = Matrix4::identity();
                if axis.x != 0.0 {
                    m[(0, 0)] = -1.0;
                }
                if axis.y != 0.0 {
                    m[(1, 1)] = -1.0;
                }
                if axis.z != 0.0 {
                    m[(2, 2)] = -1.0;
                }
                m
            }
        }
    }
}

/// Arena-backed node tree with a synthetic top-level group at index 0
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl NodeTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Group)],
            root: None,
        }
    }

    /// The synthetic top-level group
    pub fn top(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Resolve the effective root: the first root-tagged node in depth-first
    /// document order wins; without a tag the synthetic group is the root.
    /// Resolving an already-resolved tree returns the same node.
    pub fn resolve_root(&mut self) -> NodeId {
        let root = self
            .find_root_tag(self.top())
            .unwrap_or_else(|| self.top());
        self.root = Some(root);
        root
    }

    fn find_root_tag(&self, id: NodeId) -> Option<NodeId> {
        if self.node(id).root_tagged {
            return Some(id);
        }
        for &child in &self.node(id).children {
            if let Some(found) = self.find_root_tag(child) {
                return Some(found);
            }
        }
        None
    }

    /// The effective root; the synthetic group before resolution has run
    pub fn root(&self) -> NodeId {
        self.root.unwrap_or_else(|| self.top())
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut NodeTree, tagged: bool) -> NodeId {
        let mut node = Node::new(NodeKind::Primitive(Primitive::sphere(1.0, 8)));
        node.root_tagged = tagged;
        tree.add(node)
    }

    #[test]
    fn test_resolve_root_defaults_to_top_group() {
        let mut tree = NodeTree::new();
        let child = leaf(&mut tree, false);
        tree.add_child(tree.top(), child);

        assert_eq!(tree.resolve_root(), tree.top());
    }

    #[test]
    fn test_resolve_root_finds_tagged_node() {
        let mut tree = NodeTree::new();
        let a = leaf(&mut tree, false);
        let b = leaf(&mut tree, true);
        tree.add_child(tree.top(), a);
        tree.add_child(tree.top(), b);

        assert_eq!(tree.resolve_root(), b);
    }

    #[test]
    fn test_resolve_root_first_tag_in_document_order_wins() {
        let mut tree = NodeTree::new();
        let group = tree.add(Node::new(NodeKind::Group));
        let nested = leaf(&mut tree, true);
        tree.add_child(group, nested);
        let later = leaf(&mut tree, true);
        tree.add_child(tree.top(), group);
        tree.add_child(tree.top(), later);

        assert_eq!(tree.resolve_root(), nested);
    }

    #[test]
    fn test_resolve_root_is_idempotent() {
        let mut tree = NodeTree::new();
        let a = leaf(&mut tree, true);
        tree.add_child(tree.top(), a);

        let first = tree.resolve_root();
        let second = tree.resolve_root();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rotate_matrix_z() {
        let m = TransformOp::Rotate(Vector3::new(0.0, 0.0, 90.0)).to_matrix();
        let p = m.transform_point(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 0.0).abs() < 1e-9);
        assert!((p.y - 1.0).abs() < 1e-9);
    }
}
