// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! SVG writer
//!
//! One path element with the even-odd fill rule, so reversed contours render
//! as holes.

use crate::geometry::Outline;
use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fmt::Write as _;
use std::io::Write;

pub fn write<W: Write>(outline: &Outline, writer: &mut W) -> Result<()> {
    let bbox = outline.bounding_box();
    let (min_x, min_y, width, height) = if bbox.is_empty() {
        (0.0, 0.0, 1.0, 1.0)
    } else {
        (
            bbox.min.x,
            bbox.min.y,
            (bbox.max.x - bbox.min.x).max(1e-6),
            (bbox.max.y - bbox.min.y).max(1e-6),
        )
    };

    let mut xml = Writer::new_with_indent(writer, b' ', 1);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width_attr = format!("{}", width);
    let height_attr = format!("{}", height);
    let viewbox = format!("{} {} {} {}", min_x, -min_y - height, width, height);
    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    svg.push_attribute(("width", width_attr.as_str()));
    svg.push_attribute(("height", height_attr.as_str()));
    svg.push_attribute(("viewBox", viewbox.as_str()));
    xml.write_event(Event::Start(svg))?;

    let mut data = String::new();
    for contour in &outline.contours {
        for (i, point) in contour.iter().enumerate() {
            // SVG y axis points down
            let _ = write!(
                data,
                "{}{},{}",
                if i == 0 { "M " } else { " L " },
                point.x,
                -point.y
            );
        }
        data.push_str(" Z ");
    }

    let mut path = BytesStart::new("path");
    path.push_attribute(("d", data.trim_end()));
    path.push_attribute(("fill", "lightgray"));
    path.push_attribute(("stroke", "black"));
    path.push_attribute(("fill-rule", "evenodd"));
    xml.write_event(Event::Empty(path))?;

    xml.write_event(Event::End(BytesEnd::new("svg")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Primitive};
    use nalgebra::Vector2;

    #[test]
    fn test_write_square_svg() {
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
        assert!(text.contains("<svg"));
        assert!(text.contains("fill-rule=\"evenodd\""));
        assert!(text.contains("M 0,"));
    }
}
