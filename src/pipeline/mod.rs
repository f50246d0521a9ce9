// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Batch pipeline
//!
//! One run: load and augment the script, build the node tree, resolve the
//! explicit root, then dispatch on the requested output format. Term-dump
//! paths evaluate boolean terms only, boundary formats run the full geometry
//! evaluation exactly once, and AST/echo paths evaluate nothing. The working
//! directory is restored before any output file is opened so destination
//! paths resolve against the invoker.

mod deps;
mod workdir;

pub use deps::{DependencySet, DependencyWriter};
pub use workdir::WorkingDirectoryGuard;

use crate::ast::TreeBuilder;
use crate::csg::Term;
use crate::error::PipelineError;
use crate::export::{self, OutputFormat};
use crate::geometry::GeometryEvaluator;
use crate::io::{parse_script, ScriptLoader};
use crate::render::{self, Camera};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

/// How a raster image is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Full boundary-representation evaluation, then rasterization
    Full,
    /// Accurate term-based preview (default)
    Preview,
    /// Fast approximate preview drawing every term leaf
    ThrownTogether,
}

/// Everything a single batch run needs
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub deps_output: Option<PathBuf>,
    /// Pre-formatted `name=value;` statements appended to the script
    pub definitions: String,
    pub render_mode: RenderMode,
    pub camera: Camera,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            deps_output: None,
            definitions: String::new(),
            render_mode: RenderMode::Preview,
            camera: Camera::default(),
        }
    }
}

/// What a completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub format: OutputFormat,
    /// How many times full geometry evaluation ran (0 or 1)
    pub geometry_evaluations: usize,
}

/// Execute one batch run
pub fn run(config: &RunConfig) -> Result<RunSummary, PipelineError> {
    let format = OutputFormat::from_path(&config.output)?;

    // A dependency request for a format without a build rule fails before any
    // evaluation work starts
    if config.deps_output.is_some() && !format.supports_deps() {
        return Err(PipelineError::UnsupportedFormat(format!(
            "don't know how to write deps for output file '{}'",
            config.output.display()
        )));
    }

    let guard = WorkingDirectoryGuard::capture()?;
    let mut deps = DependencySet::new();

    let loaded = ScriptLoader::load(&config.input, &config.definitions, &mut deps)?;
    let module = parse_script(&loaded.source).map_err(|e| PipelineError::Parse {
        path: loaded.path.clone(),
        message: e.to_string(),
    })?;

    // Relative paths inside the script resolve against its own directory
    guard.enter(&loaded.document_dir)?;

    let mut builder = TreeBuilder::new();
    let mut tree = builder.build(&module);
    tree.resolve_root();

    let evaluator = GeometryEvaluator::new();

    match format {
        OutputFormat::Csg => {
            let term = Term::from_tree(&tree);
            guard.restore()?;
            let mut file = create_output(&config.output)?;
            export::write_term_script(term.as_ref(), &mut file)
                .map_err(|e| write_error(&config.output, e))?;
        }
        OutputFormat::Term => {
            let term = Term::from_tree(&tree);
            guard.restore()?;
            let mut file = create_output(&config.output)?;
            export::write_term_raw(term.as_ref(), &mut file)
                .map_err(|e| write_error(&config.output, e))?;
        }
        OutputFormat::Ast => {
            guard.restore()?;
            let mut file = create_output(&config.output)?;
            export::write_ast(&module, &mut file).map_err(|e| write_error(&config.output, e))?;
        }
        OutputFormat::Echo => {
            guard.restore()?;
            let mut file = create_output(&config.output)?;
            export::write_echo(builder.echoes(), &mut file)
                .map_err(|e| write_error(&config.output, e))?;
        }
        OutputFormat::Png => {
            let image = match config.render_mode {
                RenderMode::Full => {
                    let geometry = evaluator.evaluate(&tree)?;
                    render::render_geometry(geometry, &config.camera)
                }
                RenderMode::Preview | RenderMode::ThrownTogether => {
                    let include_subtracted = config.render_mode == RenderMode::ThrownTogether;
                    match Term::from_tree(&tree) {
                        Some(term) => {
                            render::render_preview(&term, &config.camera, include_subtracted)
                        }
                        None => render::render_scene(&[], &config.camera),
                    }
                }
            };
            guard.restore()?;
            write_deps_if_requested(config, format, &guard, &deps)?;
            image
                .save_with_format(&config.output, image::ImageFormat::Png)
                .map_err(|e| write_error(&config.output, e))?;
        }
        OutputFormat::Stl
        | OutputFormat::Off
        | OutputFormat::Amf
        | OutputFormat::Dxf
        | OutputFormat::Svg => {
            let geometry = evaluator.evaluate(&tree)?;
            guard.restore()?;
            write_deps_if_requested(config, format, &guard, &deps)?;

            if let Some(expected) = format.required_dimension() {
                let actual = geometry.dimension();
                if actual != expected {
                    return Err(PipelineError::DimensionMismatch { expected, actual });
                }
            }

            export::export_geometry(format, geometry, &config.output)?;
        }
    }

    Ok(RunSummary {
        format,
        geometry_evaluations: evaluator.evaluations(),
    })
}

fn write_deps_if_requested(
    config: &RunConfig,
    format: OutputFormat,
    guard: &WorkingDirectoryGuard,
    deps: &DependencySet,
) -> Result<(), PipelineError> {
    if let Some(deps_output) = &config.deps_output {
        DependencyWriter::write(deps_output, &config.output, format, guard.original(), deps)?;
    }
    Ok(())
}

fn create_output(path: &Path) -> Result<File, PipelineError> {
    File::create(path).map_err(|e| PipelineError::io(path, e))
}

fn write_error(
    path: &Path,
    error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> PipelineError {
    PipelineError::io(path, io::Error::new(io::ErrorKind::Other, error))
}
