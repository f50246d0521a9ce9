// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Tree builder - instantiates a parsed module into a node tree
//!
//! File-scope assignments are hoisted with last-assignment-wins before any
//! object is instantiated, so definitions appended at the end of the source
//! (command-line `-D` values) override in-file values. Block-scoped
//! assignments apply sequentially inside their block only.

use super::node::{Node, NodeId, NodeKind, NodeTree, TransformOp};
use super::syntax::{Arg, BinOp, Expr, Modifier, ObjKind, ObjStmt, ScriptModule, Stmt};
use crate::geometry::{BooleanOp, Primitive};
use nalgebra::{Vector2, Vector3};
use std::collections::HashMap;
use std::fmt;

/// A resolved runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undef,
    Number(f64),
    Bool(bool),
    Str(String),
    Vector(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undef => write!(f, "undef"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Vector(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

type Env = HashMap<String, Value>;

/// Evaluate an expression against an environment
pub fn eval_expr(expr: &Expr, env: &Env) -> Value {
    match expr {
        Expr::Number(n) => Value::Number(*n),
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Str(s) => Value::Str(s.clone()),
        Expr::Ident(name) => env.get(name).cloned().unwrap_or(Value::Undef),
        Expr::Vector(items) => Value::Vector(items.iter().map(|e| eval_expr(e, env)).collect()),
        Expr::Neg(inner) => match eval_expr(inner, env) {
            Value::Number(n) => Value::Number(-n),
            Value::Vector(items) => Value::Vector(
                items
                    .into_iter()
                    .map(|v| match v {
                        Value::Number(n) => Value::Number(-n),
                        other => other,
                    })
                    .collect(),
            ),
            _ => Value::Undef,
        },
        Expr::Binary { op, lhs, rhs } => {
            apply_binary(*op, eval_expr(lhs, env), eval_expr(rhs, env))
        }
    }
}

fn apply_binary(op: BinOp, lhs: Value, rhs: Value) -> Value {
    match (op, lhs, rhs) {
        (BinOp::Add, Value::Number(a), Value::Number(b)) => Value::Number(a + b),
        (BinOp::Sub, Value::Number(a), Value::Number(b)) => Value::Number(a - b),
        (BinOp::Mul, Value::Number(a), Value::Number(b)) => Value::Number(a * b),
        (BinOp::Div, Value::Number(a), Value::Number(b)) => Value::Number(a / b),
        (BinOp::Add, Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Value::Vector(
            a.into_iter()
                .zip(b)
                .map(|(x, y)| apply_binary(BinOp::Add, x, y))
                .collect(),
        ),
        (BinOp::Sub, Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Value::Vector(
            a.into_iter()
                .zip(b)
                .map(|(x, y)| apply_binary(BinOp::Sub, x, y))
                .collect(),
        ),
        (BinOp::Mul, Value::Vector(a), Value::Number(s))
        | (BinOp::Mul, Value::Number(s), Value::Vector(a)) => Value::Vector(
            a.into_iter()
                .map(|x| apply_binary(BinOp::Mul, x, Value::Number(s)))
                .collect(),
        ),
        (BinOp::Div, Value::Vector(a), Value::Number(s)) => Value::Vector(
            a.into_iter()
                .map(|x| apply_binary(BinOp::Div, x, Value::Number(s)))
                .collect(),
        ),
        _ => Value::Undef,
    }
}

/// Resolved call arguments, named and positional
struct Params {
    named: HashMap<String, Value>,
    positional: Vec<Value>,
}

impl Params {
    fn resolve(args: &[Arg], env: &Env) -> Self {
        let mut named = HashMap::new();
        let mut positional = Vec::new();
        for arg in args {
            let value = eval_expr(&arg.value, env);
            match &arg.name {
                Some(name) => {
                    named.insert(name.clone(), value);
                }
                None => positional.push(value),
            }
        }
        Self { named, positional }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }

    fn boolean(&self, name: &str) -> Option<bool> {
        match self.get(name) {
            Some(Value::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    fn positional(&self, idx: usize) -> Option<&Value> {
        self.positional.get(idx)
    }

    fn positional_number(&self, idx: usize) -> Option<f64> {
        match self.positional(idx) {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }
}

fn value_to_vec3(value: &Value, fill: f64) -> Option<Vector3<f64>> {
    match value {
        Value::Number(n) => Some(Vector3::new(*n, *n, *n)),
        Value::Vector(items) => {
            let nums: Vec<f64> = items
                .iter()
                .filter_map(|v| match v {
                    Value::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            match nums.len() {
                1 => Some(Vector3::new(nums[0], nums[0], nums[0])),
                2 => Some(Vector3::new(nums[0], nums[1], fill)),
                3 => Some(Vector3::new(nums[0], nums[1], nums[2])),
                _ => None,
            }
        }
        _ => None,
    }
}

fn value_to_vec2(value: &Value) -> Option<Vector2<f64>> {
    match value {
        Value::Number(n) => Some(Vector2::new(*n, *n)),
        Value::Vector(items) => {
            let nums: Vec<f64> = items
                .iter()
                .filter_map(|v| match v {
                    Value::Number(n) => Some(*n),
                    _ => None,
                })
                .collect();
            match nums.len() {
                1 => Some(Vector2::new(nums[0], nums[0])),
                2 => Some(Vector2::new(nums[0], nums[1])),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Instantiates parsed modules into node trees, capturing `echo()` output
pub struct TreeBuilder {
    echoes: Vec<String>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self { echoes: Vec::new() }
    }

    /// Captured echo messages in document order
    pub fn echoes(&self) -> &[String] {
        &self.echoes
    }

    pub fn take_echoes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.echoes)
    }

    /// Instantiate a module under a fresh synthetic top-level group
    pub fn build(&mut self, module: &ScriptModule) -> NodeTree {
        let mut tree = NodeTree::new();

        // Hoist file-scope assignments, last one wins
        let mut env = Env::new();
        for stmt in &module.statements {
            if let Stmt::Assign { name, value } = stmt {
                let resolved = eval_expr(value, &env);
                env.insert(name.clone(), resolved);
            }
        }

        for stmt in &module.statements {
            match stmt {
                Stmt::Assign { .. } => {}
                Stmt::Echo { args } => self.capture_echo(args, &env),
                Stmt::Object(obj) => {
                    if let Some(id) = self.build_object(&mut tree, obj, &env) {
                        let top = tree.top();
                        tree.add_child(top, id);
                    }
                }
            }
        }

        tree
    }

    fn build_block(&mut self, tree: &mut NodeTree, stmts: &[Stmt], env: &Env) -> Vec<NodeId> {
        let mut env = env.clone();
        let mut children = Vec::new();

        for stmt in stmts {
            match stmt {
                Stmt::Assign { name, value } => {
                    let resolved = eval_expr(value, &env);
                    env.insert(name.clone(), resolved);
                }
                Stmt::Echo { args } => self.capture_echo(args, &env),
                Stmt::Object(obj) => {
                    if let Some(id) = self.build_object(tree, obj, &env) {
                        children.push(id);
                    }
                }
            }
        }

        children
    }

    fn build_object(&mut self, tree: &mut NodeTree, obj: &ObjStmt, env: &Env) -> Option<NodeId> {
        if obj.modifier == Modifier::Disable {
            return None;
        }

        let params = Params::resolve(&obj.args, env);

        let id = match obj.kind {
            ObjKind::Cube => {
                let size = params
                    .get("size")
                    .or_else(|| params.positional(0))
                    .and_then(|v| value_to_vec3(v, 1.0))
                    .unwrap_or(Vector3::new(1.0, 1.0, 1.0));
                let center = params.boolean("center").unwrap_or(false);
                tree.add(Node::new(NodeKind::Primitive(Primitive::Cube {
                    size,
                    center,
                })))
            }
            ObjKind::Sphere => {
                let r = params
                    .number("r")
                    .or_else(|| params.number("d").map(|d| d / 2.0))
                    .or_else(|| params.positional_number(0))
                    .unwrap_or(1.0);
                tree.add(Node::new(NodeKind::Primitive(Primitive::sphere(
                    r,
                    self.segments(&params, env),
                ))))
            }
            ObjKind::Cylinder => {
                let h = params
                    .number("h")
                    .or_else(|| params.positional_number(0))
                    .unwrap_or(1.0);
                let r = params
                    .number("r")
                    .or_else(|| params.number("d").map(|d| d / 2.0))
                    .or_else(|| params.positional_number(1))
                    .unwrap_or(1.0);
                let r1 = params
                    .number("r1")
                    .or_else(|| params.number("d1").map(|d| d / 2.0))
                    .unwrap_or(r);
                let r2 = params
                    .number("r2")
                    .or_else(|| params.number("d2").map(|d| d / 2.0))
                    .unwrap_or(r);
                let center = params.boolean("center").unwrap_or(false);
                tree.add(Node::new(NodeKind::Primitive(Primitive::cylinder(
                    h,
                    r1,
                    r2,
                    center,
                    self.segments(&params, env),
                ))))
            }
            ObjKind::Square => {
                let size = params
                    .get("size")
                    .or_else(|| params.positional(0))
                    .and_then(value_to_vec2)
                    .unwrap_or(Vector2::new(1.0, 1.0));
                let center = params.boolean("center").unwrap_or(false);
                tree.add(Node::new(NodeKind::Primitive(Primitive::Square {
                    size,
                    center,
                })))
            }
            ObjKind::Circle => {
                let r = params
                    .number("r")
                    .or_else(|| params.number("d").map(|d| d / 2.0))
                    .or_else(|| params.positional_number(0))
                    .unwrap_or(1.0);
                tree.add(Node::new(NodeKind::Primitive(Primitive::circle(
                    r,
                    self.segments(&params, env),
                ))))
            }
            ObjKind::Translate | ObjKind::Rotate | ObjKind::Scale | ObjKind::Mirror => {
                let op = self.transform_op(obj.kind, &params);
                let node = tree.add(Node::new(NodeKind::Transform(op)));
                for child in self.build_block(tree, &obj.children, env) {
                    tree.add_child(node, child);
                }
                node
            }
            ObjKind::Union | ObjKind::Difference | ObjKind::Intersection => {
                let op = match obj.kind {
                    ObjKind::Union => BooleanOp::Union,
                    ObjKind::Difference => BooleanOp::Difference,
                    _ => BooleanOp::Intersection,
                };
                let node = tree.add(Node::new(NodeKind::Boolean(op)));
                for child in self.build_block(tree, &obj.children, env) {
                    tree.add_child(node, child);
                }
                node
            }
            ObjKind::Group => {
                let node = tree.add(Node::new(NodeKind::Group));
                for child in self.build_block(tree, &obj.children, env) {
                    tree.add_child(node, child);
                }
                node
            }
        };

        if obj.modifier == Modifier::Root {
            tree.node_mut(id).root_tagged = true;
        }

        Some(id)
    }

    fn transform_op(&self, kind: ObjKind, params: &Params) -> TransformOp {
        let vector_arg = |name: &str, fill: f64, default: Vector3<f64>| {
            params
                .get(name)
                .or_else(|| params.positional(0))
                .and_then(|v| value_to_vec3(v, fill))
                .unwrap_or(default)
        };

        match kind {
            ObjKind::Translate => TransformOp::Translate(vector_arg("v", 0.0, Vector3::zeros())),
            ObjKind::Rotate => {
                // A bare scalar rotates about Z
                let angles = match params.get("a").or_else(|| params.positional(0)) {
                    Some(Value::Number(a)) => Vector3::new(0.0, 0.0, *a),
                    Some(value) => value_to_vec3(value, 0.0).unwrap_or(Vector3::zeros()),
                    None => Vector3::zeros(),
                };
                TransformOp::Rotate(angles)
            }
            ObjKind::Scale => {
                TransformOp::Scale(vector_arg("v", 1.0, Vector3::new(1.0, 1.0, 1.0)))
            }
            _ => TransformOp::Mirror(vector_arg("v", 0.0, Vector3::new(1.0, 0.0, 0.0))),
        }
    }

    fn segments(&self, params: &Params, env: &Env) -> u32 {
        params
            .number("$fn")
            .or_else(|| match env.get("$fn") {
                Some(Value::Number(n)) => Some(*n),
                _ => None,
            })
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0)
    }

    fn capture_echo(&mut self, args: &[Arg], env: &Env) {
        let parts: Vec<String> = args
            .iter()
            .map(|arg| {
                let value = eval_expr(&arg.value, env);
                match &arg.name {
                    Some(name) => format!("{} = {}", name, value),
                    None => value.to_string(),
                }
            })
            .collect();
        self.echoes.push(format!("ECHO: {}", parts.join(", ")));
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_script;

    fn build(source: &str) -> (NodeTree, Vec<String>) {
        let module = parse_script(source).unwrap();
        let mut builder = TreeBuilder::new();
        let tree = builder.build(&module);
        (tree, builder.take_echoes())
    }

    #[test]
    fn test_build_cube_under_top_group() {
        let (tree, _) = build("cube([10, 10, 10]);");
        assert_eq!(tree.node(tree.top()).children.len(), 1);
        let child = tree.node(tree.top()).children[0];
        assert!(matches!(
            tree.node(child).kind,
            NodeKind::Primitive(Primitive::Cube { .. })
        ));
    }

    #[test]
    fn test_last_assignment_wins_at_file_scope() {
        let (tree, _) = build("s = 2;\ncube(s);\ns = 8;");
        let child = tree.node(tree.top()).children[0];
        let NodeKind::Primitive(Primitive::Cube { size, .. }) = &tree.node(child).kind else {
            panic!("expected cube");
        };
        assert_eq!(size.x, 8.0);
    }

    #[test]
    fn test_variable_arithmetic() {
        let (tree, _) = build("w = 3 * 4;\ncube([w, 1, 1]);");
        let child = tree.node(tree.top()).children[0];
        let NodeKind::Primitive(Primitive::Cube { size, .. }) = &tree.node(child).kind else {
            panic!("expected cube");
        };
        assert_eq!(size.x, 12.0);
    }

    #[test]
    fn test_root_modifier_tags_node() {
        let (mut tree, _) = build("cube(1);\n!sphere(2);");
        let root = tree.resolve_root();
        assert!(matches!(
            tree.node(root).kind,
            NodeKind::Primitive(Primitive::Sphere { .. })
        ));
    }

    #[test]
    fn test_disable_modifier_skips_node() {
        let (tree, _) = build("*cube(1);\nsphere(2);");
        assert_eq!(tree.node(tree.top()).children.len(), 1);
    }

    #[test]
    fn test_echo_capture_in_document_order() {
        let (_, echoes) = build("echo(\"a\", 1);\ncube(1);\necho(x = 2 + 3);");
        assert_eq!(echoes, vec!["ECHO: \"a\", 1", "ECHO: x = 5"]);
    }

    #[test]
    fn test_cylinder_diameter_parameters() {
        let (tree, _) = build("cylinder(h = 4, d1 = 6, d2 = 2);");
        let child = tree.node(tree.top()).children[0];
        let NodeKind::Primitive(Primitive::Cylinder { r1, r2, .. }) = &tree.node(child).kind
        else {
            panic!("expected cylinder");
        };
        assert_eq!(*r1, 3.0);
        assert_eq!(*r2, 1.0);
    }

    #[test]
    fn test_scalar_rotate_is_about_z() {
        let (tree, _) = build("rotate(45) cube(1);");
        let child = tree.node(tree.top()).children[0];
        let NodeKind::Transform(TransformOp::Rotate(angles)) = &tree.node(child).kind else {
            panic!("expected rotate");
        };
        assert_eq!(angles.z, 45.0);
    }

    #[test]
    fn test_special_variable_segments() {
        let (tree, _) = build("$fn = 12;\nsphere(5);");
        let child = tree.node(tree.top()).children[0];
        let NodeKind::Primitive(Primitive::Sphere { segments, .. }) = &tree.node(child).kind
        else {
            panic!("expected sphere");
        };
        assert_eq!(*segments, 12);
    }

    #[test]
    fn test_index_space_is_fresh_per_build() {
        let module = parse_script("cube(1);").unwrap();
        let mut builder = TreeBuilder::new();
        let first = builder.build(&module);
        let second = builder.build(&module);
        assert_eq!(first.len(), second.len());
        assert_eq!(second.top(), NodeId(0));
    }
}
