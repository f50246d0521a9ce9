// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Export module - output format selection and serialization
//!
//! The format is resolved exactly once from the destination suffix; every
//! later decision in the pipeline dispatches on the closed enum, so adding a
//! format is a single table edit checked for exhaustiveness by the compiler.

mod amf;
mod dump;
mod dxf;
mod off;
mod stl;
mod svg;

pub use dump::{write_ast, write_echo, write_term_raw, write_term_script};

use crate::error::PipelineError;
use crate::geometry::Geometry;
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// Requested output format, derived from the destination suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Stl,
    Off,
    Amf,
    Dxf,
    Svg,
    Csg,
    Ast,
    Term,
    Echo,
    Png,
}

impl OutputFormat {
    /// Resolve a destination path to a format; the match is case-insensitive,
    /// total and exclusive
    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let suffix = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        match suffix.as_str() {
            "stl" => Ok(OutputFormat::Stl),
            "off" => Ok(OutputFormat::Off),
            "amf" => Ok(OutputFormat::Amf),
            "dxf" => Ok(OutputFormat::Dxf),
            "svg" => Ok(OutputFormat::Svg),
            "csg" => Ok(OutputFormat::Csg),
            "ast" => Ok(OutputFormat::Ast),
            "term" => Ok(OutputFormat::Term),
            "echo" => Ok(OutputFormat::Echo),
            "png" => Ok(OutputFormat::Png),
            _ => Err(PipelineError::UnsupportedFormat(format!(
                "unknown suffix for output file '{}'",
                path.display()
            ))),
        }
    }

    /// Dimension a boundary exporter requires, if this format exports one
    pub fn required_dimension(&self) -> Option<u32> {
        match self {
            OutputFormat::Stl | OutputFormat::Off | OutputFormat::Amf => Some(3),
            OutputFormat::Dxf | OutputFormat::Svg => Some(2),
            _ => None,
        }
    }

    /// Whether a build-dependency rule can be written for this format
    pub fn supports_deps(&self) -> bool {
        matches!(
            self,
            OutputFormat::Stl
                | OutputFormat::Off
                | OutputFormat::Amf
                | OutputFormat::Dxf
                | OutputFormat::Svg
                | OutputFormat::Png
        )
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Stl => "stl",
            OutputFormat::Off => "off",
            OutputFormat::Amf => "amf",
            OutputFormat::Dxf => "dxf",
            OutputFormat::Svg => "svg",
            OutputFormat::Csg => "csg",
            OutputFormat::Ast => "ast",
            OutputFormat::Term => "term",
            OutputFormat::Echo => "echo",
            OutputFormat::Png => "png",
        };
        write!(f, "{}", name)
    }
}

/// Open the destination and serialize evaluated geometry into it
pub fn export_geometry(
    format: OutputFormat,
    geometry: &Geometry,
    path: &Path,
) -> Result<(), PipelineError> {
    let mut file = File::create(path).map_err(|e| PipelineError::io(path, e))?;

    let result = match (format, geometry) {
        (OutputFormat::Stl, Geometry::Solid(mesh)) => stl::write(mesh, &mut file),
        (OutputFormat::Off, Geometry::Solid(mesh)) => off::write(mesh, &mut file),
        (OutputFormat::Amf, Geometry::Solid(mesh)) => amf::write(mesh, &mut file),
        (OutputFormat::Dxf, Geometry::Drawing(outline)) => dxf::write(outline, &mut file),
        (OutputFormat::Svg, Geometry::Drawing(outline)) => svg::write(outline, &mut file),
        (format, geometry) => Err(anyhow::anyhow!(
            "no {} serializer for {}D geometry",
            format,
            geometry.dimension()
        )),
    };

    result.map_err(|e| PipelineError::io(path, io::Error::new(io::ErrorKind::Other, e)))
}
