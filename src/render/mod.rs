// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Raster rendering for image export

mod camera;
mod raster;

pub use camera::{Camera, CameraKind, Projection};
pub use raster::render_scene;

use crate::csg::Term;
use crate::geometry::Geometry;
use image::RgbImage;

/// Render fully evaluated geometry
pub fn render_geometry(geometry: &Geometry, camera: &Camera) -> RgbImage {
    render_scene(std::slice::from_ref(geometry), camera)
}

/// Render directly from a boolean term, without boundary evaluation.
///
/// The accurate preview draws only positive leaves, so subtracted volumes are
/// simply absent; the thrown-together variant draws every leaf.
pub fn render_preview(term: &Term, camera: &Camera, include_subtracted: bool) -> RgbImage {
    let leaves: Vec<Geometry> = term
        .leaves()
        .into_iter()
        .filter(|leaf| leaf.positive || include_subtracted)
        .map(|leaf| {
            let mut geometry = leaf.primitive.to_geometry();
            geometry.transform(leaf.matrix);
            geometry
        })
        .collect();

    render_scene(&leaves, camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TreeBuilder;
    use crate::io::parse_script;

    fn term_for(source: &str) -> Term {
        let module = parse_script(source).unwrap();
        let mut builder = TreeBuilder::new();
        let mut tree = builder.build(&module);
        tree.resolve_root();
        Term::from_tree(&tree).unwrap()
    }

    #[test]
    fn test_preview_skips_subtracted_leaves() {
        let term = term_for("difference() { cube(10); translate([20, 0, 0]) cube(10); }");

        // Fixed placement: auto-fit would rescale the two renders differently
        let mut camera = Camera::default();
        camera.kind = CameraKind::Gimbal {
            translate: nalgebra::Vector3::new(15.0, 5.0, 5.0),
            rotate: nalgebra::Vector3::new(55.0, 0.0, 25.0),
            distance: 60.0,
        };
        camera.explicit = true;

        let preview = render_preview(&term, &camera, false);
        let thrown = render_preview(&term, &camera, true);

        let count = |image: &RgbImage| {
            image
                .pixels()
                .filter(|p| **p != image::Rgb([250u8, 250, 250]))
                .count()
        };
        assert!(count(&thrown) > count(&preview));
    }
}
