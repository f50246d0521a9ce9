// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Software rasterizer
//!
//! Depth-buffered flat shading for solids, even-odd scanline fill for
//! drawings. Good enough for batch raster export; nothing here aims for
//! real-time quality.

use super::camera::{Camera, Projection};
use crate::geometry::{BoundingBox, Geometry};
use image::{Rgb, RgbImage};
use nalgebra::{Point2, Point3, Vector3};

const BACKGROUND: Rgb<u8> = Rgb([250, 250, 250]);
const SOLID_COLOR: [f64; 3] = [245.0, 217.0, 98.0];
const DRAWING_COLOR: Rgb<u8> = Rgb([129, 181, 122]);

struct ViewTriangle {
    points: [Point3<f64>; 3],
    brightness: f64,
}

/// Render a set of geometries into an image
pub fn render_scene(geometries: &[Geometry], camera: &Camera) -> RgbImage {
    let mut image = RgbImage::from_pixel(camera.width, camera.height, BACKGROUND);

    let view = camera.view_matrix();
    let mut triangles = Vec::new();
    let mut contours: Vec<Vec<Point3<f64>>> = Vec::new();

    for geometry in geometries {
        match geometry {
            Geometry::Solid(mesh) => {
                for triangle in &mesh.triangles {
                    let points = [
                        view.transform_point(&mesh.vertices[triangle.indices[0]].position),
                        view.transform_point(&mesh.vertices[triangle.indices[1]].position),
                        view.transform_point(&mesh.vertices[triangle.indices[2]].position),
                    ];
                    let normal = (points[1] - points[0]).cross(&(points[2] - points[0]));
                    let brightness = if normal.norm() > 0.0 {
                        0.3 + 0.7 * normal.normalize().dot(&Vector3::z()).abs()
                    } else {
                        0.3
                    };
                    triangles.push(ViewTriangle { points, brightness });
                }
            }
            Geometry::Drawing(outline) => {
                for contour in &outline.contours {
                    contours.push(
                        contour
                            .iter()
                            .map(|p| view.transform_point(&Point3::new(p.x, p.y, 0.0)))
                            .collect(),
                    );
                }
            }
        }
    }

    let mut projected_triangles = Vec::new();
    let mut projected_contours = Vec::new();
    let mut all_points = Vec::new();

    let project = |p: &Point3<f64>| -> Point3<f64> {
        match camera.projection {
            Projection::Orthographic => *p,
            Projection::Perspective => {
                let z = p.z.min(-1e-3);
                Point3::new(p.x / -z, p.y / -z, p.z)
            }
        }
    };

    for triangle in &triangles {
        let points = triangle.points.map(|p| project(&p));
        all_points.extend_from_slice(&points);
        projected_triangles.push(ViewTriangle {
            points,
            brightness: triangle.brightness,
        });
    }
    for contour in &contours {
        let projected: Vec<Point3<f64>> = contour.iter().map(project).collect();
        all_points.extend_from_slice(&projected);
        projected_contours.push(projected);
    }

    if all_points.is_empty() {
        return image;
    }

    let mapping = viewport_mapping(&all_points, camera);

    let mut depth = vec![f64::NEG_INFINITY; (camera.width * camera.height) as usize];
    for triangle in &projected_triangles {
        fill_triangle(&mut image, &mut depth, triangle, &mapping, camera);
    }
    if !projected_contours.is_empty() {
        fill_contours(&mut image, &projected_contours, &mapping, camera);
    }

    image
}

struct ViewportMapping {
    scale: f64,
    center: Point2<f64>,
    width: f64,
    height: f64,
}

impl ViewportMapping {
    fn to_screen(&self, p: &Point3<f64>) -> (f64, f64) {
        (
            (p.x - self.center.x) * self.scale + self.width / 2.0,
            self.height / 2.0 - (p.y - self.center.y) * self.scale,
        )
    }
}

fn viewport_mapping(points: &[Point3<f64>], camera: &Camera) -> ViewportMapping {
    let width = camera.width as f64;
    let height = camera.height as f64;

    if camera.autofit() {
        let mut bbox = BoundingBox::empty();
        for p in points {
            bbox.expand_to_include(p);
        }
        let extent = bbox.size();
        let center = bbox.center();
        ViewportMapping {
            scale: 0.9 * (width / extent.x.max(1e-6)).min(height / extent.y.max(1e-6)),
            center: Point2::new(center.x, center.y),
            width,
            height,
        }
    } else {
        let span = match camera.projection {
            Projection::Orthographic => 1.2 * camera.zoom_distance(),
            Projection::Perspective => 1.2,
        };
        ViewportMapping {
            scale: width.min(height) / span,
            center: Point2::origin(),
            width,
            height,
        }
    }
}

fn fill_triangle(
    image: &mut RgbImage,
    depth: &mut [f64],
    triangle: &ViewTriangle,
    mapping: &ViewportMapping,
    camera: &Camera,
) {
    let screen: Vec<(f64, f64, f64)> = triangle
        .points
        .iter()
        .map(|p| {
            let (x, y) = mapping.to_screen(p);
            (x, y, p.z)
        })
        .collect();

    let min_x = screen.iter().map(|p| p.0).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
    let max_x = screen
        .iter()
        .map(|p| p.0)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(camera.width as f64 - 1.0);
    let min_y = screen.iter().map(|p| p.1).fold(f64::INFINITY, f64::min).floor().max(0.0) as u32;
    let max_y = screen
        .iter()
        .map(|p| p.1)
        .fold(f64::NEG_INFINITY, f64::max)
        .ceil()
        .min(camera.height as f64 - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }

    let (ax, ay, az) = screen[0];
    let (bx, by, bz) = screen[1];
    let (cx, cy, cz) = screen[2];
    let area = (bx - ax) * (cy - ay) - (cx - ax) * (by - ay);
    if area.abs() < 1e-12 {
        return;
    }

    let color = Rgb([
        (SOLID_COLOR[0] * triangle.brightness).min(255.0) as u8,
        (SOLID_COLOR[1] * triangle.brightness).min(255.0) as u8,
        (SOLID_COLOR[2] * triangle.brightness).min(255.0) as u8,
    ]);

    for y in min_y..=max_y as u32 {
        for x in min_x..=max_x as u32 {
            let px = x as f64 + 0.5;
            let py = y as f64 + 0.5;
            let w0 = ((bx - ax) * (py - ay) - (px - ax) * (by - ay)) / area;
            let w1 = ((px - ax) * (cy - ay) - (cx - ax) * (py - ay)) / area;
            let w2 = 1.0 - w0 - w1;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let z = az * w2 + bz * w1 + cz * w0;
            let index = (y * camera.width + x) as usize;
            if z > depth[index] {
                depth[index] = z;
                image.put_pixel(x, y, color);
            }
        }
    }
}

fn fill_contours(
    image: &mut RgbImage,
    contours: &[Vec<Point3<f64>>],
    mapping: &ViewportMapping,
    camera: &Camera,
) {
    let screen: Vec<Vec<(f64, f64)>> = contours
        .iter()
        .map(|contour| contour.iter().map(|p| mapping.to_screen(p)).collect())
        .collect();

    for y in 0..camera.height {
        let py = y as f64 + 0.5;
        let mut crossings = Vec::new();

        for contour in &screen {
            let n = contour.len();
            for i in 0..n {
                let (x0, y0) = contour[i];
                let (x1, y1) = contour[(i + 1) % n];
                if (y0 <= py) != (y1 <= py) {
                    crossings.push(x0 + (py - y0) / (y1 - y0) * (x1 - x0));
                }
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks(2) {
            if pair.len() < 2 {
                break;
            }
            let start = pair[0].ceil().max(0.0) as u32;
            let end = pair[1].floor().min(camera.width as f64 - 1.0);
            if end < 0.0 {
                continue;
            }
            for x in start..=end as u32 {
                image.put_pixel(x, y, DRAWING_COLOR);
            }
        }
    }
}
