// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Binary STL writer

use crate::geometry::Mesh;
use anyhow::Result;
use std::io::Write;

pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    let triangles: Vec<stl_io::Triangle> = mesh
        .triangles
        .iter()
        .map(|triangle| {
            let normal = mesh.face_normal(triangle);
            stl_io::Triangle {
                normal: stl_io::Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: triangle.indices.map(|i| {
                    let p = mesh.vertices[i].position;
                    stl_io::Vertex::new([p.x as f32, p.y as f32, p.z as f32])
                }),
            }
        })
        .collect();

    stl_io::write_stl(writer, triangles.into_iter())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Primitive};
    use nalgebra::Vector3;

    #[test]
    fn test_write_cube_stl() {
        let Geometry::Solid(mesh) = (Primitive::Cube {
            size: Vector3::new(10.0, 10.0, 10.0),
            center: false,
        })
        .to_geometry() else {
            unreachable!()
        };

        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        // 80-byte header + count + 12 triangles at 50 bytes each
        assert_eq!(buffer.len(), 80 + 4 + 12 * 50);
    }
}
