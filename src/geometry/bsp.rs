// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Mesh boolean operations using a BSP tree

use super::{BooleanOp, Mesh, Triangle, Vertex};
use nalgebra::{Point3, Vector3};

const EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Clone)]
struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

impl Plane {
    fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let n = (b - a).cross(&(c - a));
        if n.norm() < EPSILON {
            return None;
        }
        let normal = n.normalize();
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn split_polygon(
        &self,
        polygon: &Polygon,
        coplanar_front: &mut Vec<Polygon>,
        coplanar_back: &mut Vec<Polygon>,
        front: &mut Vec<Polygon>,
        back: &mut Vec<Polygon>,
    ) {
        let mut polygon_type = 0u8;
        let mut types = Vec::with_capacity(polygon.vertices.len());

        for vertex in &polygon.vertices {
            let t = self.normal.dot(&vertex.position.coords) - self.w;
            let vertex_type = if t < -EPSILON {
                BACK
            } else if t > EPSILON {
                FRONT
            } else {
                COPLANAR
            };
            polygon_type |= vertex_type;
            types.push(vertex_type);
        }

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            }
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                // SPANNING: split along the plane
                let mut f = Vec::new();
                let mut b = Vec::new();
                let n = polygon.vertices.len();
                for i in 0..n {
                    let j = (i + 1) % n;
                    let ti = types[i];
                    let tj = types[j];
                    let vi = &polygon.vertices[i];
                    let vj = &polygon.vertices[j];

                    if ti != BACK {
                        f.push(*vi);
                    }
                    if ti != FRONT {
                        b.push(*vi);
                    }
                    if (ti | tj) == SPANNING {
                        let denom = self.normal.dot(&(vj.position - vi.position));
                        let t = (self.w - self.normal.dot(&vi.position.coords)) / denom;
                        let v = vi.interpolate(vj, t);
                        f.push(v);
                        b.push(v);
                    }
                }
                if let Some(p) = Polygon::new(f) {
                    front.push(p);
                }
                if let Some(p) = Polygon::new(b) {
                    back.push(p);
                }
            }
        }
    }
}

trait Interpolate {
    fn interpolate(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for Vertex {
    fn interpolate(&self, other: &Self, t: f64) -> Self {
        let position = self.position + (other.position - self.position) * t;
        let normal = self.normal + (other.normal - self.normal) * t;
        Vertex::new(
            position,
            if normal.norm() > 0.0 {
                normal.normalize()
            } else {
                self.normal
            },
        )
    }
}

#[derive(Clone)]
struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Polygon {
    fn new(vertices: Vec<Vertex>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(
            &vertices[0].position,
            &vertices[1].position,
            &vertices[2].position,
        )?;
        Some(Self { vertices, plane })
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        for vertex in &mut self.vertices {
            vertex.normal = -vertex.normal;
        }
        self.plane.flip();
    }
}

#[derive(Default)]
struct BspNode {
    plane: Option<Plane>,
    front: Option<Box<BspNode>>,
    back: Option<Box<BspNode>>,
    polygons: Vec<Polygon>,
}

impl BspNode {
    fn from_polygons(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = &mut self.plane {
            plane.flip();
        }
        if let Some(front) = &mut self.front {
            front.invert();
        }
        if let Some(back) = &mut self.back {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = &self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
        }
        front.append(&mut coplanar_front);
        back.append(&mut coplanar_back);

        let mut front = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        let back = match &self.back {
            Some(node) => node.clip_polygons(back),
            None => Vec::new(),
        };

        front.extend(back);
        front
    }

    fn clip_to(&mut self, other: &BspNode) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = &mut self.front {
            front.clip_to(other);
        }
        if let Some(back) = &mut self.back {
            back.clip_to(other);
        }
    }

    fn all_polygons(&self) -> Vec<Polygon> {
        let mut polygons = self.polygons.clone();
        if let Some(front) = &self.front {
            polygons.extend(front.all_polygons());
        }
        if let Some(back) = &self.back {
            polygons.extend(back.all_polygons());
        }
        polygons
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        if polygons.is_empty() {
            return;
        }
        let plane = match &self.plane {
            Some(plane) => plane.clone(),
            None => {
                let plane = polygons[0].plane.clone();
                self.plane = Some(plane.clone());
                plane
            }
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        for polygon in &polygons {
            plane.split_polygon(
                polygon,
                &mut coplanar_front,
                &mut coplanar_back,
                &mut front,
                &mut back,
            );
        }
        self.polygons.append(&mut coplanar_front);
        self.polygons.append(&mut coplanar_back);

        if !front.is_empty() {
            self.front
                .get_or_insert_with(|| Box::new(BspNode::default()))
                .build(front);
        }
        if !back.is_empty() {
            self.back
                .get_or_insert_with(|| Box::new(BspNode::default()))
                .build(back);
        }
    }
}

fn mesh_to_polygons(mesh: &Mesh) -> Vec<Polygon> {
    mesh.triangles
        .iter()
        .filter_map(|triangle| {
            Polygon::new(vec![
                mesh.vertices[triangle.indices[0]],
                mesh.vertices[triangle.indices[1]],
                mesh.vertices[triangle.indices[2]],
            ])
        })
        .collect()
}

fn polygons_to_mesh(polygons: Vec<Polygon>) -> Mesh {
    let mut mesh = Mesh::new();
    for polygon in polygons {
        // Fan triangulation
        let first = mesh.add_vertex(polygon.vertices[0]);
        let mut prev = mesh.add_vertex(polygon.vertices[1]);
        for vertex in &polygon.vertices[2..] {
            let current = mesh.add_vertex(*vertex);
            mesh.add_triangle(Triangle::new([first, prev, current]));
            prev = current;
        }
    }
    mesh
}

/// Perform a boolean operation on two meshes
pub fn mesh_boolean(a: &Mesh, b: &Mesh, op: BooleanOp) -> Mesh {
    if a.is_empty() {
        return match op {
            BooleanOp::Union => b.clone(),
            BooleanOp::Difference | BooleanOp::Intersection => Mesh::empty(),
        };
    }
    if b.is_empty() {
        return match op {
            BooleanOp::Union | BooleanOp::Difference => a.clone(),
            BooleanOp::Intersection => Mesh::empty(),
        };
    }

    let mut na = BspNode::from_polygons(mesh_to_polygons(a));
    let mut nb = BspNode::from_polygons(mesh_to_polygons(b));

    match op {
        BooleanOp::Union => {
            na.clip_to(&nb);
            nb.clip_to(&na);
            nb.invert();
            nb.clip_to(&na);
            nb.invert();
            na.build(nb.all_polygons());
        }
        BooleanOp::Difference => {
            na.invert();
            na.clip_to(&nb);
            nb.clip_to(&na);
            nb.invert();
            nb.clip_to(&na);
            nb.invert();
            na.build(nb.all_polygons());
            na.invert();
        }
        BooleanOp::Intersection => {
            na.invert();
            nb.clip_to(&na);
            nb.invert();
            na.clip_to(&nb);
            nb.clip_to(&na);
            na.build(nb.all_polygons());
            na.invert();
        }
    }

    polygons_to_mesh(na.all_polygons())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Primitive};
    use nalgebra::{Matrix4, Vector3};

    fn cube(size: f64, offset: f64) -> Mesh {
        let Geometry::Solid(mut mesh) = (Primitive::Cube {
            size: Vector3::new(size, size, size),
            center: false,
        })
        .to_geometry() else {
            unreachable!()
        };
        mesh.transform(&Matrix4::new_translation(&Vector3::new(
            offset, offset, offset,
        )));
        mesh
    }

    #[test]
    fn test_union_of_overlapping_cubes() {
        let result = mesh_boolean(&cube(10.0, 0.0), &cube(10.0, 5.0), BooleanOp::Union);
        assert!(!result.is_empty());
        let bbox = result.bounding_box();
        assert!(bbox.max.x > 14.0);
        assert!(bbox.min.x < 1.0);
    }

    #[test]
    fn test_difference_carves_material() {
        let result = mesh_boolean(&cube(10.0, 0.0), &cube(10.0, 5.0), BooleanOp::Difference);
        assert!(!result.is_empty());
        let bbox = result.bounding_box();
        assert!(bbox.max.x <= 10.0 + 1e-6);
    }

    #[test]
    fn test_intersection_of_disjoint_cubes_is_empty() {
        let result = mesh_boolean(&cube(5.0, 0.0), &cube(5.0, 20.0), BooleanOp::Intersection);
        assert!(result.is_empty());
    }

    #[test]
    fn test_union_with_empty_operand() {
        let a = cube(5.0, 0.0);
        let result = mesh_boolean(&a, &Mesh::empty(), BooleanOp::Union);
        assert_eq!(result.triangle_count(), a.triangle_count());
    }
}
