// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Geometry module - mesh and outline representation, booleans, evaluation

mod bbox;
mod bsp;
mod evaluator;
mod mesh;
mod outline;
mod primitives;

pub use bbox::BoundingBox;
pub use bsp::mesh_boolean;
pub use evaluator::GeometryEvaluator;
pub use mesh::{Mesh, Triangle, Vertex};
pub use outline::{outline_boolean, Outline};
pub use primitives::Primitive;

/// Boolean combination operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

/// A fully evaluated boundary representation, tagged with its dimension
#[derive(Debug, Clone)]
pub enum Geometry {
    /// 3-D solid
    Solid(Mesh),
    /// 2-D drawing
    Drawing(Outline),
}

impl Geometry {
    pub fn dimension(&self) -> u32 {
        match self {
            Geometry::Solid(_) => 3,
            Geometry::Drawing(_) => 2,
        }
    }

    pub fn transform(&mut self, matrix: &nalgebra::Matrix4<f64>) {
        match self {
            Geometry::Solid(mesh) => mesh.transform(matrix),
            Geometry::Drawing(outline) => outline.transform(matrix),
        }
    }
}
