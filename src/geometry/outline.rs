// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! 2-D outline representation and contour booleans
//!
//! Contours are closed polygons; rendering and the drawing exporters use the
//! even-odd fill rule, so a subtracted shape becomes a reversed contour and
//! intersections are resolved by convex clipping.

use super::{BooleanOp, BoundingBox};
use nalgebra::{Matrix4, Point2, Point3};

/// A 2-D shape as a set of closed contours
#[derive(Debug, Clone, Default)]
pub struct Outline {
    pub contours: Vec<Vec<Point2<f64>>>,
}

impl Outline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.iter().all(|c| c.len() < 3)
    }

    /// Apply the XY part of a transform to every contour point
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for contour in &mut self.contours {
            for point in contour.iter_mut() {
                let p = matrix.transform_point(&Point3::new(point.x, point.y, 0.0));
                *point = Point2::new(p.x, p.y);
            }
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for contour in &self.contours {
            for point in contour {
                bbox.expand_to_include(&Point3::new(point.x, point.y, 0.0));
            }
        }
        bbox
    }

}

fn signed_area(contour: &[Point2<f64>]) -> f64 {
    let mut area = 0.0;
    for i in 0..contour.len() {
        let a = contour[i];
        let b = contour[(i + 1) % contour.len()];
        area += a.x * b.y - b.x * a.y;
    }
    area / 2.0
}

fn oriented(mut contour: Vec<Point2<f64>>, counter_clockwise: bool) -> Vec<Point2<f64>> {
    if (signed_area(&contour) > 0.0) != counter_clockwise {
        contour.reverse();
    }
    contour
}

/// Sutherland-Hodgman clip of a contour against one convex contour
fn clip_convex(subject: &[Point2<f64>], clip: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let clip = oriented(clip.to_vec(), true);
    let mut output = subject.to_vec();

    for i in 0..clip.len() {
        if output.is_empty() {
            break;
        }
        let a = clip[i];
        let b = clip[(i + 1) % clip.len()];

        let inside = |p: &Point2<f64>| (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x) >= 0.0;
        let intersect = |p: &Point2<f64>, q: &Point2<f64>| {
            let d1 = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            let d2 = (b.x - a.x) * (q.y - a.y) - (b.y - a.y) * (q.x - a.x);
            let t = d1 / (d1 - d2);
            Point2::new(p.x + (q.x - p.x) * t, p.y + (q.y - p.y) * t)
        };

        let input = std::mem::take(&mut output);
        for j in 0..input.len() {
            let current = input[j];
            let previous = input[(j + input.len() - 1) % input.len()];
            if inside(&current) {
                if !inside(&previous) {
                    output.push(intersect(&previous, &current));
                }
                output.push(current);
            } else if inside(&previous) {
                output.push(intersect(&previous, &current));
            }
        }
    }

    output
}

/// Combine two outlines with a boolean operator
pub fn outline_boolean(a: &Outline, b: &Outline, op: BooleanOp) -> Outline {
    match op {
        BooleanOp::Union => {
            let mut contours = a.contours.clone();
            contours.extend(b.contours.iter().cloned().map(|c| oriented(c, true)));
            Outline { contours }
        }
        BooleanOp::Difference => {
            // Subtracted contours flip orientation; even-odd fill turns
            // contained ones into holes
            let mut contours: Vec<_> = a
                .contours
                .iter()
                .cloned()
                .map(|c| oriented(c, true))
                .collect();
            contours.extend(b.contours.iter().cloned().map(|c| oriented(c, false)));
            Outline { contours }
        }
        BooleanOp::Intersection => {
            let mut contours = Vec::new();
            for subject in &a.contours {
                for clip in &b.contours {
                    let clipped = clip_convex(subject, clip);
                    if clipped.len() >= 3 {
                        contours.push(clipped);
                    }
                }
            }
            Outline { contours }
        }
    }
}
