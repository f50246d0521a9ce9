// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Triangle mesh representation

use super::{mesh_boolean, BooleanOp, BoundingBox};
use nalgebra::{Matrix4, Point3, Vector3};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        // Normals transform by the inverse transpose
        let normal_matrix = matrix
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or(*matrix);
        let transformed = normal_matrix.transform_vector(&self.normal);
        if transformed.norm() > 0.0 {
            self.normal = transformed.normalize();
        }
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_vertices(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Face normal of a triangle, recomputed from positions
    pub fn face_normal(&self, triangle: &Triangle) -> Vector3<f64> {
        let a = self.vertices[triangle.indices[0]].position;
        let b = self.vertices[triangle.indices[1]].position;
        let c = self.vertices[triangle.indices[2]].position;
        let n = (b - a).cross(&(c - a));
        if n.norm() > 0.0 {
            n.normalize()
        } else {
            Vector3::z()
        }
    }

    /// Combine with another mesh using a boolean operator
    pub fn boolean(&self, other: &Mesh, op: BooleanOp) -> Mesh {
        mesh_boolean(self, other, op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_translates_positions() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vertex::new(Point3::origin(), Vector3::z()));
        mesh.transform(&Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(mesh.vertices[0].position, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_face_normal_recomputed_from_positions() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Vertex::new(Point3::origin(), Vector3::x()));
        let v1 = mesh.add_vertex(Vertex::new(Point3::new(1.0, 0.0, 0.0), Vector3::x()));
        let v2 = mesh.add_vertex(Vertex::new(Point3::new(0.0, 1.0, 0.0), Vector3::x()));
        mesh.add_triangle(Triangle::new([v0, v1, v2]));

        let normal = mesh.face_normal(&mesh.triangles[0]);
        assert!((normal - Vector3::z()).norm() < 1e-12);
    }
}
