// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! DXF writer
//!
//! Minimal entities-only DXF: one closed LWPOLYLINE per contour.

use crate::geometry::Outline;
use anyhow::Result;
use std::io::Write;

pub fn write<W: Write>(outline: &Outline, writer: &mut W) -> Result<()> {
    writeln!(writer, "0\nSECTION\n2\nENTITIES")?;

    for contour in &outline.contours {
        writeln!(writer, "0\nLWPOLYLINE\n8\n0")?;
        writeln!(writer, "90\n{}", contour.len())?;
        // 70/1 marks the polyline closed
        writeln!(writer, "70\n1")?;
        for point in contour {
            writeln!(writer, "10\n{}\n20\n{}", point.x, point.y)?;
        }
    }

    writeln!(writer, "0\nENDSEC\n0\nEOF")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Primitive};
    use nalgebra::Vector2;

    #[test]
    fn test_write_square_dxf() {
        let Geometry::Drawing(outline) = (Primitive::Square {
            size: Vector2::new(10.0, 5.0),
            center: false,
        })
        .to_geometry() else {
            unreachable!()
        };

        let mut buffer = Vec::new();
        write(&outline, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.starts_with("0\nSECTION\n2\nENTITIES\n"));
        assert_eq!(text.matches("LWPOLYLINE").count(), 1);
        assert!(text.trim_end().ends_with("EOF"));
    }
}
