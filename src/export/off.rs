// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! OFF writer

use crate::geometry::Mesh;
use anyhow::Result;
use std::io::Write;

pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "OFF")?;
    writeln!(
        writer,
        "{} {} 0",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;

    for vertex in &mesh.vertices {
        let p = vertex.position;
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    for triangle in &mesh.triangles {
        writeln!(
            writer,
            "3 {} {} {}",
            triangle.indices[0], triangle.indices[1], triangle.indices[2]
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Primitive};
    use nalgebra::Vector3;

    #[test]
    fn test_write_cube_off() {
        let Geometry::Solid(mesh) = (Primitive::Cube {
            size: Vector3::new(1.0, 1.0, 1.0),
            center: false,
        })
        .to_geometry() else {
            unreachable!()
        };

        let mut buffer = Vec::new();
        write(&mesh, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("OFF\n36 12 0\n"));
        assert_eq!(text.lines().count(), 2 + 36 + 12);
    }
}
