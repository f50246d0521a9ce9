// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Geometric primitives generator

use super::{Geometry, Mesh, Outline, Triangle, Vertex};
use nalgebra::{Point2, Point3, Vector2, Vector3};
use std::f64::consts::PI;
use std::fmt;

const DEFAULT_SEGMENTS: u32 = 32;

/// Geometric primitives, 3-D solids and 2-D shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Cube {
        size: Vector3<f64>,
        center: bool,
    },
    Sphere {
        r: f64,
        segments: u32,
    },
    Cylinder {
        h: f64,
        r1: f64,
        r2: f64,
        center: bool,
        segments: u32,
    },
    Square {
        size: Vector2<f64>,
        center: bool,
    },
    Circle {
        r: f64,
        segments: u32,
    },
}

impl Primitive {
    pub fn sphere(r: f64, segments: u32) -> Self {
        Self::Sphere {
            r,
            segments: effective_segments(segments),
        }
    }

    pub fn cylinder(h: f64, r1: f64, r2: f64, center: bool, segments: u32) -> Self {
        Self::Cylinder {
            h,
            r1,
            r2,
            center,
            segments: effective_segments(segments),
        }
    }

    pub fn circle(r: f64, segments: u32) -> Self {
        Self::Circle {
            r,
            segments: effective_segments(segments),
        }
    }

    /// Dimension of the boundary representation this primitive produces
    pub fn dimension(&self) -> u32 {
        match self {
            Primitive::Cube { .. } | Primitive::Sphere { .. } | Primitive::Cylinder { .. } => 3,
            Primitive::Square { .. } | Primitive::Circle { .. } => 2,
        }
    }

    /// Tessellate into a dimension-tagged boundary representation
    pub fn to_geometry(&self) -> Geometry {
        match self {
            Primitive::Cube { size, center } => Geometry::Solid(cube_mesh(*size, *center)),
            Primitive::Sphere { r, segments } => Geometry::Solid(sphere_mesh(*r, *segments)),
            Primitive::Cylinder {
                h,
                r1,
                r2,
                center,
                segments,
            } => Geometry::Solid(cylinder_mesh(*h, *r1, *r2, *center, *segments)),
            Primitive::Square { size, center } => Geometry::Drawing(square_outline(*size, *center)),
            Primitive::Circle { r, segments } => Geometry::Drawing(circle_outline(*r, *segments)),
        }
    }
}

fn effective_segments(segments: u32) -> u32 {
    if segments >= 3 {
        segments
    } else {
        DEFAULT_SEGMENTS
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Primitive::Cube { size, center } => write!(
                f,
                "cube(size = [{}, {}, {}], center = {})",
                size.x, size.y, size.z, center
            ),
            Primitive::Sphere { r, segments } => write!(f, "sphere(r = {}, $fn = {})", r, segments),
            Primitive::Cylinder {
                h,
                r1,
                r2,
                center,
                segments,
            } => write!(
                f,
                "cylinder(h = {}, r1 = {}, r2 = {}, center = {}, $fn = {})",
                h, r1, r2, center, segments
            ),
            Primitive::Square { size, center } => write!(
                f,
                "square(size = [{}, {}], center = {})",
                size.x, size.y, center
            ),
            Primitive::Circle { r, segments } => write!(f, "circle(r = {}, $fn = {})", r, segments),
        }
    }
}

fn cube_mesh(size: Vector3<f64>, center: bool) -> Mesh {
    let mut mesh = Mesh::new();

    let (min, max) = if center {
        (
            Point3::new(-size.x / 2.0, -size.y / 2.0, -size.z / 2.0),
            Point3::new(size.x / 2.0, size.y / 2.0, size.z / 2.0),
        )
    } else {
        (Point3::origin(), Point3::new(size.x, size.y, size.z))
    };

    let positions = [
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = [
        // Top (z+)
        ([4, 5, 6], Vector3::new(0.0, 0.0, 1.0)),
        ([4, 6, 7], Vector3::new(0.0, 0.0, 1.0)),
        // Bottom (z-)
        ([1, 0, 3], Vector3::new(0.0, 0.0, -1.0)),
        ([1, 3, 2], Vector3::new(0.0, 0.0, -1.0)),
        // Right (x+)
        ([5, 1, 2], Vector3::new(1.0, 0.0, 0.0)),
        ([5, 2, 6], Vector3::new(1.0, 0.0, 0.0)),
        // Left (x-)
        ([0, 4, 7], Vector3::new(-1.0, 0.0, 0.0)),
        ([0, 7, 3], Vector3::new(-1.0, 0.0, 0.0)),
        // Back (y+)
        ([7, 6, 2], Vector3::new(0.0, 1.0, 0.0)),
        ([7, 2, 3], Vector3::new(0.0, 1.0, 0.0)),
        // Front (y-)
        ([0, 1, 5], Vector3::new(0.0, -1.0, 0.0)),
        ([0, 5, 4], Vector3::new(0.0, -1.0, 0.0)),
    ];

    for (indices, normal) in faces {
        let v0 = mesh.add_vertex(Vertex::new(positions[indices[0]], normal));
        let v1 = mesh.add_vertex(Vertex::new(positions[indices[1]], normal));
        let v2 = mesh.add_vertex(Vertex::new(positions[indices[2]], normal));
        mesh.add_triangle(Triangle::new([v0, v1, v2]));
    }

    mesh
}

fn sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let stacks = segments;
    let slices = segments;

    for i in 0..=stacks {
        let phi = PI * i as f64 / stacks as f64;
        let z = radius * phi.cos();
        let ring = radius * phi.sin();

        for j in 0..=slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            let x = ring * theta.cos();
            let y = ring * theta.sin();

            let position = Point3::new(x, y, z);
            let normal = if radius > 0.0 {
                Vector3::new(x, y, z) / radius
            } else {
                Vector3::z()
            };
            mesh.add_vertex(Vertex::new(position, normal));
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = (i * row + j) as usize;
            let b = a + 1;
            let c = ((i + 1) * row + j) as usize;
            let d = c + 1;

            if i > 0 {
                mesh.add_triangle(Triangle::new([a, c, b]));
            }
            if i < stacks - 1 {
                mesh.add_triangle(Triangle::new([b, c, d]));
            }
        }
    }

    mesh
}

fn cylinder_mesh(h: f64, r1: f64, r2: f64, center: bool, segments: u32) -> Mesh {
    let mut mesh = Mesh::new();
    let z0 = if center { -h / 2.0 } else { 0.0 };
    let z1 = z0 + h;

    let ring = |r: f64, z: f64| -> Vec<Point3<f64>> {
        (0..segments)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / segments as f64;
                Point3::new(r * theta.cos(), r * theta.sin(), z)
            })
            .collect()
    };

    let bottom = ring(r1, z0);
    let top = ring(r2, z1);

    // Side wall
    for i in 0..segments as usize {
        let j = (i + 1) % segments as usize;
        let side_normal = {
            let mid = bottom[i].coords + top[i].coords;
            let mut n = Vector3::new(mid.x, mid.y, 0.0);
            if n.norm() > 0.0 {
                n = n.normalize();
            } else {
                n = Vector3::x();
            }
            n
        };
        let b0 = mesh.add_vertex(Vertex::new(bottom[i], side_normal));
        let b1 = mesh.add_vertex(Vertex::new(bottom[j], side_normal));
        let t0 = mesh.add_vertex(Vertex::new(top[i], side_normal));
        let t1 = mesh.add_vertex(Vertex::new(top[j], side_normal));
        if r1 > 0.0 {
            mesh.add_triangle(Triangle::new([b0, b1, t1]));
        }
        if r2 > 0.0 {
            mesh.add_triangle(Triangle::new([b0, t1, t0]));
        }
    }

    // Caps
    let down = Vector3::new(0.0, 0.0, -1.0);
    let up = Vector3::z();
    if r1 > 0.0 {
        let c = mesh.add_vertex(Vertex::new(Point3::new(0.0, 0.0, z0), down));
        for i in 0..segments as usize {
            let j = (i + 1) % segments as usize;
            let a = mesh.add_vertex(Vertex::new(bottom[i], down));
            let b = mesh.add_vertex(Vertex::new(bottom[j], down));
            mesh.add_triangle(Triangle::new([c, b, a]));
        }
    }
    if r2 > 0.0 {
        let c = mesh.add_vertex(Vertex::new(Point3::new(0.0, 0.0, z1), up));
        for i in 0..segments as usize {
            let j = (i + 1) % segments as usize;
            let a = mesh.add_vertex(Vertex::new(top[i], up));
            let b = mesh.add_vertex(Vertex::new(top[j], up));
            mesh.add_triangle(Triangle::new([c, a, b]));
        }
    }

    mesh
}

fn square_outline(size: Vector2<f64>, center: bool) -> Outline {
    let (min, max) = if center {
        (
            Point2::new(-size.x / 2.0, -size.y / 2.0),
            Point2::new(size.x / 2.0, size.y / 2.0),
        )
    } else {
        (Point2::origin(), Point2::new(size.x, size.y))
    };

    Outline {
        contours: vec![vec![
            Point2::new(min.x, min.y),
            Point2::new(max.x, min.y),
            Point2::new(max.x, max.y),
            Point2::new(min.x, max.y),
        ]],
    }
}

fn circle_outline(r: f64, segments: u32) -> Outline {
    let contour = (0..segments)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / segments as f64;
            Point2::new(r * theta.cos(), r * theta.sin())
        })
        .collect();

    Outline {
        contours: vec![contour],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use approx::assert_relative_eq;

    #[test]
    fn test_cube_mesh() {
        let Geometry::Solid(mesh) = (Primitive::Cube {
            size: Vector3::new(2.0, 2.0, 2.0),
            center: true,
        })
        .to_geometry() else {
            panic!("cube must be solid");
        };
        assert_eq!(mesh.triangle_count(), 12);
        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.min.x, -1.0);
        assert_relative_eq!(bbox.max.z, 1.0);
    }

    #[test]
    fn test_sphere_mesh_radius() {
        let Geometry::Solid(mesh) = Primitive::sphere(5.0, 16).to_geometry() else {
            panic!("sphere must be solid");
        };
        assert!(mesh.triangle_count() > 0);
        for v in &mesh.vertices {
            assert_relative_eq!(v.position.coords.norm(), 5.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cylinder_centered() {
        let Geometry::Solid(mesh) = Primitive::cylinder(10.0, 3.0, 3.0, true, 16).to_geometry()
        else {
            panic!("cylinder must be solid");
        };
        let bbox = mesh.bounding_box();
        assert_relative_eq!(bbox.min.z, -5.0);
        assert_relative_eq!(bbox.max.z, 5.0);
    }

    #[test]
    fn test_square_is_drawing() {
        let geometry = (Primitive::Square {
            size: Vector2::new(4.0, 2.0),
            center: false,
        })
        .to_geometry();
        assert_eq!(geometry.dimension(), 2);
    }

    #[test]
    fn test_display_labels() {
        let label = Primitive::sphere(2.5, 0).to_string();
        assert_eq!(label, "sphere(r = 2.5, $fn = 32)");
    }
}
