// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! View camera for raster export

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Orthographic,
    Perspective,
}

/// Camera placement, gimbal (translate/rotate/distance) or eye/center form
#[derive(Debug, Clone)]
pub enum CameraKind {
    Gimbal {
        translate: Vector3<f64>,
        rotate: Vector3<f64>,
        distance: f64,
    },
    Vector {
        eye: Point3<f64>,
        center: Point3<f64>,
    },
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub kind: CameraKind,
    pub projection: Projection,
    pub width: u32,
    pub height: u32,
    pub autocenter: bool,
    pub viewall: bool,
    /// Set when the placement came from an explicit --camera argument
    pub explicit: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            kind: CameraKind::Gimbal {
                translate: Vector3::zeros(),
                rotate: Vector3::new(55.0, 0.0, 25.0),
                distance: 140.0,
            },
            projection: Projection::Orthographic,
            width: 512,
            height: 512,
            autocenter: false,
            viewall: false,
            explicit: false,
        }
    }
}

impl Camera {
    /// Parse a camera argument: 7 numbers for gimbal placement or 6 for
    /// eye/center placement
    pub fn parse_placement(text: &str) -> Result<CameraKind, String> {
        let numbers: Result<Vec<f64>, _> =
            text.split(',').map(|s| s.trim().parse::<f64>()).collect();
        let numbers = numbers.map_err(|_| {
            "camera setup requires 7 numbers for gimbal placement or 6 for eye/center placement"
                .to_string()
        })?;

        match numbers.len() {
            7 => Ok(CameraKind::Gimbal {
                translate: Vector3::new(numbers[0], numbers[1], numbers[2]),
                rotate: Vector3::new(numbers[3], numbers[4], numbers[5]),
                distance: numbers[6],
            }),
            6 => Ok(CameraKind::Vector {
                eye: Point3::new(numbers[0], numbers[1], numbers[2]),
                center: Point3::new(numbers[3], numbers[4], numbers[5]),
            }),
            _ => Err(
                "camera setup requires 7 numbers for gimbal placement or 6 for eye/center placement"
                    .to_string(),
            ),
        }
    }

    /// World-to-view transform
    pub fn view_matrix(&self) -> Matrix4<f64> {
        match &self.kind {
            CameraKind::Gimbal {
                translate,
                rotate,
                distance,
            } => {
                let rx = UnitQuaternion::from_axis_angle(
                    &Vector3::x_axis(),
                    (-rotate.x).to_radians(),
                );
                let ry = UnitQuaternion::from_axis_angle(
                    &Vector3::y_axis(),
                    (-rotate.y).to_radians(),
                );
                let rz = UnitQuaternion::from_axis_angle(
                    &Vector3::z_axis(),
                    (-rotate.z).to_radians(),
                );
                Matrix4::new_translation(&Vector3::new(0.0, 0.0, -distance))
                    * (rx * ry * rz).to_homogeneous()
                    * Matrix4::new_translation(&-translate)
            }
            CameraKind::Vector { eye, center } => {
                Matrix4::look_at_rh(eye, center, &Vector3::z())
            }
        }
    }

    /// Distance used for zoom when the view is not auto-fitted
    pub fn zoom_distance(&self) -> f64 {
        match &self.kind {
            CameraKind::Gimbal { distance, .. } => distance.abs().max(1e-6),
            CameraKind::Vector { eye, center } => (eye - center).norm().max(1e-6),
        }
    }

    /// Whether the viewport should be fitted to the scene bounds
    pub fn autofit(&self) -> bool {
        !self.explicit || self.autocenter || self.viewall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gimbal_placement() {
        let kind = Camera::parse_placement("0,0,0,55,0,25,140").unwrap();
        assert!(matches!(kind, CameraKind::Gimbal { distance, .. } if distance == 140.0));
    }

    #[test]
    fn test_parse_vector_placement() {
        let kind = Camera::parse_placement("10, 10, 10, 0, 0, 0").unwrap();
        assert!(matches!(kind, CameraKind::Vector { .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_arity() {
        assert!(Camera::parse_placement("1,2,3").is_err());
        assert!(Camera::parse_placement("a,b,c,d,e,f").is_err());
    }

    #[test]
    fn test_default_view_is_in_front_of_camera() {
        let camera = Camera::default();
        let p = camera.view_matrix().transform_point(&Point3::origin());
        assert!(p.z < 0.0);
    }
}
