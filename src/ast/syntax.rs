// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Syntactic script module
//!
//! The parser produces this structure verbatim from source text; no variable
//! resolution or geometry instantiation happens here. The AST export path
//! serializes it directly, which is why everything derives `Serialize`.

use serde::Serialize;

/// A parsed script: the top-level statement list in document order
#[derive(Debug, Clone, Serialize)]
pub struct ScriptModule {
    pub statements: Vec<Stmt>,
}

/// A single statement
#[derive(Debug, Clone, Serialize)]
pub enum Stmt {
    Assign { name: String, value: Expr },
    Echo { args: Vec<Arg> },
    Object(ObjStmt),
}

/// An object instantiation with its modifier, arguments and child statements
#[derive(Debug, Clone, Serialize)]
pub struct ObjStmt {
    pub modifier: Modifier,
    pub kind: ObjKind,
    pub args: Vec<Arg>,
    pub children: Vec<Stmt>,
}

/// Statement modifiers: `!` promotes the subtree to the evaluated root,
/// `*` removes the subtree from instantiation entirely
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Modifier {
    None,
    Root,
    Disable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObjKind {
    Cube,
    Sphere,
    Cylinder,
    Square,
    Circle,
    Translate,
    Rotate,
    Scale,
    Mirror,
    Union,
    Difference,
    Intersection,
    Group,
}

/// A call argument, positional or named
#[derive(Debug, Clone, Serialize)]
pub struct Arg {
    pub name: Option<String>,
    pub value: Expr,
}

/// An unevaluated expression
#[derive(Debug, Clone, Serialize)]
pub enum Expr {
    Number(f64),
    Bool(bool),
    Str(String),
    Ident(String),
    Vector(Vec<Expr>),
    Neg(Box<Expr>),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}
