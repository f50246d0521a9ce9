// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Pipeline error taxonomy
//!
//! Every variant is terminal for a run: the binary maps any of them to a
//! message on stderr and exit status 1. There is no retry or recovery.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the batch pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A file could not be opened, read or written
    #[error("can't open file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script could not be parsed
    #[error("can't parse file '{}':\n{message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Output suffix not recognized, or a dependency file was requested
    /// for a format that has no build rule
    #[error("{0}")]
    UnsupportedFormat(String),

    /// Full evaluation produced no usable top-level object
    #[error("no top-level object found")]
    EmptyGeometry,

    /// Evaluated geometry dimension disagrees with the exporter requirement
    #[error("current top level object is not a {expected}D object (got {actual}D)")]
    DimensionMismatch { expected: u32, actual: u32 },

    /// A working-directory change failed
    #[error("can't change directory to '{}': {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
