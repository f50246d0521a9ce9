// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Boolean-term evaluation
//!
//! A term is the intermediate combination tree over leaf primitives, built
//! without computing any boundary representation. The term-dump output paths
//! and the preview renderer consume it; full geometry evaluation never does.

use crate::ast::{NodeId, NodeKind, NodeTree};
use crate::geometry::{BooleanOp, Primitive};
use nalgebra::Matrix4;
use std::fmt::Write;

/// A boolean-combination term over leaf solids
#[derive(Debug, Clone)]
pub enum Term {
    Leaf {
        primitive: Primitive,
        matrix: Matrix4<f64>,
    },
    Union(Vec<Term>),
    Difference(Vec<Term>),
    Intersection(Vec<Term>),
}

/// A term leaf with its polarity: `false` for subtracted volumes
#[derive(Debug, Clone)]
pub struct TermLeaf<'a> {
    pub primitive: &'a Primitive,
    pub matrix: &'a Matrix4<f64>,
    pub positive: bool,
}

impl Term {
    /// Evaluate the resolved root of a tree into a term, or `None` when the
    /// tree contains no geometry at all
    pub fn from_tree(tree: &NodeTree) -> Option<Term> {
        eval_term(tree, tree.root(), &Matrix4::identity())
    }

    /// Raw infix dump: `+` union, `-` difference, `*` intersection
    pub fn dump(&self) -> String {
        match self {
            Term::Leaf { primitive, .. } => primitive.to_string(),
            Term::Union(children) => join_infix(children, " + "),
            Term::Difference(children) => join_infix(children, " - "),
            Term::Intersection(children) => join_infix(children, " * "),
        }
    }

    /// Script-shaped dump used by the CSG text output
    pub fn dump_script(&self) -> String {
        let mut out = String::new();
        self.write_script(&mut out, 0);
        out
    }

    fn write_script(&self, out: &mut String, depth: usize) {
        let indent = "\t".repeat(depth);
        match self {
            Term::Leaf { primitive, matrix } => {
                if is_identity(matrix) {
                    let _ = writeln!(out, "{}{};", indent, primitive);
                } else {
                    let _ = writeln!(out, "{}multmatrix({}) {{", indent, format_matrix(matrix));
                    let _ = writeln!(out, "{}\t{};", indent, primitive);
                    let _ = writeln!(out, "{}}}", indent);
                }
            }
            Term::Union(children) => write_block(out, depth, "union", children),
            Term::Difference(children) => write_block(out, depth, "difference", children),
            Term::Intersection(children) => write_block(out, depth, "intersection", children),
        }
    }

    /// Flatten into leaves with polarity, for preview rendering
    pub fn leaves(&self) -> Vec<TermLeaf<'_>> {
        let mut out = Vec::new();
        self.collect_leaves(true, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, positive: bool, out: &mut Vec<TermLeaf<'a>>) {
        match self {
            Term::Leaf { primitive, matrix } => out.push(TermLeaf {
                primitive,
                matrix,
                positive,
            }),
            Term::Union(children) | Term::Intersection(children) => {
                for child in children {
                    child.collect_leaves(positive, out);
                }
            }
            Term::Difference(children) => {
                let mut iter = children.iter();
                if let Some(base) = iter.next() {
                    base.collect_leaves(positive, out);
                }
                for subtracted in iter {
                    subtracted.collect_leaves(!positive, out);
                }
            }
        }
    }
}

fn join_infix(children: &[Term], separator: &str) -> String {
    let parts: Vec<String> = children.iter().map(|c| c.dump()).collect();
    format!("({})", parts.join(separator))
}

fn write_block(out: &mut String, depth: usize, name: &str, children: &[Term]) {
    let indent = "\t".repeat(depth);
    let _ = writeln!(out, "{}{}() {{", indent, name);
    for child in children {
        child.write_script(out, depth + 1);
    }
    let _ = writeln!(out, "{}}}", indent);
}

fn is_identity(matrix: &Matrix4<f64>) -> bool {
    (matrix - Matrix4::identity()).norm() < 1e-12
}

fn format_matrix(matrix: &Matrix4<f64>) -> String {
    let rows: Vec<String> = (0..4)
        .map(|r| {
            let cells: Vec<String> = (0..4).map(|c| format!("{}", matrix[(r, c)])).collect();
            format!("[{}]", cells.join(", "))
        })
        .collect();
    format!("[{}]", rows.join(", "))
}

fn eval_term(tree: &NodeTree, id: NodeId, matrix: &Matrix4<f64>) -> Option<Term> {
    let node = tree.node(id);
    match &node.kind {
        NodeKind::Primitive(primitive) => Some(Term::Leaf {
            primitive: primitive.clone(),
            matrix: *matrix,
        }),
        NodeKind::Transform(op) => {
            let matrix = matrix * op.to_matrix();
            eval_term_children(tree, &node.children, &matrix, BooleanOp::Union)
        }
        NodeKind::Boolean(op) => eval_term_children(tree, &node.children, matrix, *op),
        NodeKind::Group => eval_term_children(tree, &node.children, matrix, BooleanOp::Union),
        NodeKind::Echo(_) => None,
    }
}

fn eval_term_children(
    tree: &NodeTree,
    children: &[NodeId],
    matrix: &Matrix4<f64>,
    op: BooleanOp,
) -> Option<Term> {
    let terms: Vec<Term> = children
        .iter()
        .filter_map(|&child| eval_term(tree, child, matrix))
        .collect();

    match terms.len() {
        0 => None,
        1 => terms.into_iter().next(),
        _ => Some(match op {
            BooleanOp::Union => Term::Union(terms),
            BooleanOp::Difference => Term::Difference(terms),
            BooleanOp::Intersection => Term::Intersection(terms),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TreeBuilder;
    use crate::io::parse_script;

    fn term_for(source: &str) -> Option<Term> {
        let module = parse_script(source).unwrap();
        let mut builder = TreeBuilder::new();
        let mut tree = builder.build(&module);
        tree.resolve_root();
        Term::from_tree(&tree)
    }

    #[test]
    fn test_term_for_single_cube() {
        let term = term_for("cube([10, 10, 10]);").unwrap();
        assert_eq!(
            term.dump(),
            "cube(size = [10, 10, 10], center = false)"
        );
    }

    #[test]
    fn test_difference_dump_uses_minus() {
        let term = term_for("difference() { cube(10); sphere(4); }").unwrap();
        let dump = term.dump();
        assert!(dump.starts_with('('));
        assert!(dump.contains(" - "));
    }

    #[test]
    fn test_empty_script_has_no_term() {
        assert!(term_for("x = 1;").is_none());
    }

    #[test]
    fn test_translated_leaf_keeps_matrix() {
        let term = term_for("translate([5, 0, 0]) cube(1);").unwrap();
        let Term::Leaf { matrix, .. } = &term else {
            panic!("expected a leaf");
        };
        assert_eq!(matrix[(0, 3)], 5.0);
        assert!(term.dump_script().contains("multmatrix"));
    }

    #[test]
    fn test_leaf_polarity_in_difference() {
        let term = term_for("difference() { cube(10); sphere(4); sphere(2); }").unwrap();
        let leaves = term.leaves();
        assert_eq!(leaves.len(), 3);
        assert!(leaves[0].positive);
        assert!(!leaves[1].positive);
        assert!(!leaves[2].positive);
    }

    #[test]
    fn test_script_dump_shape() {
        let term = term_for("union() { cube(1); sphere(2); }").unwrap();
        let dump = term.dump_script();
        assert!(dump.starts_with("union() {"));
        assert!(dump.trim_end().ends_with('}'));
    }
}
