// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! AMF writer

use crate::geometry::Mesh;
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

pub fn write<W: Write>(mesh: &Mesh, writer: &mut W) -> Result<()> {
    let mut xml = Writer::new_with_indent(writer, b' ', 1);

    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut amf = BytesStart::new("amf");
    amf.push_attribute(("unit", "millimeter"));
    xml.write_event(Event::Start(amf))?;

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", "0"));
    xml.write_event(Event::Start(object))?;
    xml.write_event(Event::Start(BytesStart::new("mesh")))?;

    xml.write_event(Event::Start(BytesStart::new("vertices")))?;
    for vertex in &mesh.vertices {
        xml.write_event(Event::Start(BytesStart::new("vertex")))?;
        xml.write_event(Event::Start(BytesStart::new("coordinates")))?;
        for (tag, value) in [
            ("x", vertex.position.x),
            ("y", vertex.position.y),
            ("z", vertex.position.z),
        ] {
            xml.write_event(Event::Start(BytesStart::new(tag)))?;
            xml.write_event(Event::Text(BytesText::new(&value.to_string())))?;
            xml.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        xml.write_event(Event::End(BytesEnd::new("coordinates")))?;
        xml.write_event(Event::End(BytesEnd::new("vertex")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("vertices")))?;

    xml.write_event(Event::Start(BytesStart::new("volume")))?;
    for triangle in &mesh.triangles {
        xml.write_event(Event::Start(BytesStart::new("triangle")))?;
        for (tag, index) in [
            ("v1", triangle.indices[0]),
            ("v2", triangle.indices[1]),
            ("v3", triangle.indices[2]),
        ] {
            xml.write_event(Event::Start(BytesStart::new(tag)))?;
            xml.write_event(Event::Text(BytesText::new(&index.to_string())))?;
            xml.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        xml.write_event(Event::End(BytesEnd::new("triangle")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("volume")))?;

    xml.write_event(Event::End(BytesEnd::new("mesh")))?;
    xml.write_event(Event::End(BytesEnd::new("object")))?;
    xml.write_event(Event::End(BytesEnd::new("amf")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Primitive};
    use nalgebra::Vector3;

    #[test]
    fn test_write_cube_amf() {
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
        assert!(text.contains("<amf unit=\"millimeter\">"));
        assert_eq!(text.matches("<triangle>").count(), 12);
        assert_eq!(text.matches("<vertex>").count(), 36);
    }
}
