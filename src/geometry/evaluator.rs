// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Full boundary-representation evaluation
//!
//! The most expensive stage of a run. The result is held in a once-only
//! memo slot: repeated `evaluate` calls return the cached geometry, and the
//! invocation counter makes the at-most-once property observable from tests.

use super::{outline_boolean, BooleanOp, Geometry};
use crate::ast::{NodeId, NodeKind, NodeTree};
use crate::error::PipelineError;
use nalgebra::Matrix4;
use std::cell::{Cell, OnceCell};

/// Evaluates a node tree into a dimension-tagged boundary representation
pub struct GeometryEvaluator {
    result: OnceCell<Geometry>,
    evaluations: Cell<usize>,
}

impl GeometryEvaluator {
    pub fn new() -> Self {
        Self {
            result: OnceCell::new(),
            evaluations: Cell::new(0),
        }
    }

    /// Number of times a full evaluation actually ran (0 or 1)
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }

    /// Evaluate the resolved root into geometry, at most once
    pub fn evaluate(&self, tree: &NodeTree) -> Result<&Geometry, PipelineError> {
        if let Some(geometry) = self.result.get() {
            return Ok(geometry);
        }

        self.evaluations.set(self.evaluations.get() + 1);
        let geometry = self
            .eval_node(tree, tree.root(), &Matrix4::identity())
            .ok_or(PipelineError::EmptyGeometry)?;

        Ok(self.result.get_or_init(|| geometry))
    }

    fn eval_node(
        &self,
        tree: &NodeTree,
        id: NodeId,
        matrix: &Matrix4<f64>,
    ) -> Option<Geometry> {
        let node = tree.node(id);
        match &node.kind {
            NodeKind::Primitive(primitive) => {
                let mut geometry = primitive.to_geometry();
                geometry.transform(matrix);
                Some(geometry)
            }
            NodeKind::Transform(op) => {
                let matrix = matrix * op.to_matrix();
                self.eval_children(tree, &node.children, &matrix, BooleanOp::Union)
            }
            NodeKind::Boolean(op) => self.eval_children(tree, &node.children, matrix, *op),
            NodeKind::Group => self.eval_children(tree, &node.children, matrix, BooleanOp::Union),
            NodeKind::Echo(_) => None,
        }
    }

    fn eval_children(
        &self,
        tree: &NodeTree,
        children: &[NodeId],
        matrix: &Matrix4<f64>,
        op: BooleanOp,
    ) -> Option<Geometry> {
        let mut result: Option<Geometry> = None;

        for &child in children {
            let Some(geometry) = self.eval_node(tree, child, matrix) else {
                continue;
            };

            result = Some(match result {
                None => geometry,
                Some(acc) => match (acc, geometry) {
                    (Geometry::Solid(a), Geometry::Solid(b)) => {
                        Geometry::Solid(a.boolean(&b, op))
                    }
                    (Geometry::Drawing(a), Geometry::Drawing(b)) => {
                        Geometry::Drawing(outline_boolean(&a, &b, op))
                    }
                    (acc, skipped) => {
                        eprintln!(
                            "WARNING: ignoring {}D child in a {}D boolean operation",
                            skipped.dimension(),
                            acc.dimension()
                        );
                        acc
                    }
                },
            });
        }

        result
    }
}

impl Default for GeometryEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Node, TransformOp};
    use crate::geometry::Primitive;
    use nalgebra::{Vector2, Vector3};

    fn cube_tree() -> NodeTree {
        let mut tree = NodeTree::new();
        let cube = tree.add(Node::new(NodeKind::Primitive(Primitive::Cube {
            size: Vector3::new(10.0, 10.0, 10.0),
            center: false,
        })));
        tree.add_child(tree.top(), cube);
        tree.resolve_root();
        tree
    }

    #[test]
    fn test_evaluate_cube() {
        let tree = cube_tree();
        let evaluator = GeometryEvaluator::new();
        let geometry = evaluator.evaluate(&tree).unwrap();
        assert_eq!(geometry.dimension(), 3);
    }

    #[test]
    fn test_evaluate_runs_at_most_once() {
        let tree = cube_tree();
        let evaluator = GeometryEvaluator::new();
        evaluator.evaluate(&tree).unwrap();
        evaluator.evaluate(&tree).unwrap();
        assert_eq!(evaluator.evaluations(), 1);
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let mut tree = NodeTree::new();
        tree.resolve_root();
        let evaluator = GeometryEvaluator::new();
        let err = evaluator.evaluate(&tree).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyGeometry));
    }

    #[test]
    fn test_two_dimensional_result() {
        let mut tree = NodeTree::new();
        let square = tree.add(Node::new(NodeKind::Primitive(Primitive::Square {
            size: Vector2::new(4.0, 4.0),
            center: false,
        })));
        tree.add_child(tree.top(), square);
        tree.resolve_root();

        let evaluator = GeometryEvaluator::new();
        let geometry = evaluator.evaluate(&tree).unwrap();
        assert_eq!(geometry.dimension(), 2);
    }

    #[test]
    fn test_transform_applies_to_children() {
        let mut tree = NodeTree::new();
        let translate = tree.add(Node::new(NodeKind::Transform(TransformOp::Translate(
            Vector3::new(5.0, 0.0, 0.0),
        ))));
        let cube = tree.add(Node::new(NodeKind::Primitive(Primitive::Cube {
            size: Vector3::new(2.0, 2.0, 2.0),
            center: false,
        })));
        tree.add_child(translate, cube);
        tree.add_child(tree.top(), translate);
        tree.resolve_root();

        let evaluator = GeometryEvaluator::new();
        let Geometry::Solid(mesh) = evaluator.evaluate(&tree).unwrap() else {
            panic!("expected a solid");
        };
        let bbox = mesh.bounding_box();
        assert!((bbox.min.x - 5.0).abs() < 1e-9);
    }
}
