// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Abstract syntax tree and instantiated node tree
//!
//! `syntax` is what the parser emits; `node` is the arena tree the builder
//! instantiates from it.

mod builder;
mod node;
mod syntax;

pub use builder::{eval_expr, TreeBuilder, Value};
pub use node::{Node, NodeId, NodeKind, NodeTree, TransformOp};
pub use syntax::{Arg, BinOp, Expr, Modifier, ObjKind, ObjStmt, ScriptModule, Stmt};
