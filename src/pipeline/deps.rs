// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Dependency tracking and make-rule output

use crate::error::PipelineError;
use crate::export::OutputFormat;
use std::fs;
use std::path::{Path, PathBuf};

/// Append-only ordered set of files a run has read
#[derive(Debug, Default)]
pub struct DependencySet {
    paths: Vec<PathBuf>,
}

impl DependencySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a path; returns false when it was already present
    pub fn register(&mut self, path: &Path) -> bool {
        if self.paths.iter().any(|p| p == path) {
            return false;
        }
        self.paths.push(path.to_path_buf());
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Writes a build rule binding the generated output to its dependencies
pub struct DependencyWriter;

impl DependencyWriter {
    /// Write `deps_path` containing one rule for `output_path`. Paths are
    /// expressed relative to `base`, the directory active at write time.
    /// Identical inputs produce byte-identical files.
    pub fn write(
        deps_path: &Path,
        output_path: &Path,
        format: OutputFormat,
        base: &Path,
        deps: &DependencySet,
    ) -> Result<(), PipelineError> {
        if !format.supports_deps() {
            return Err(PipelineError::UnsupportedFormat(format!(
                "don't know how to write deps for output file '{}'",
                output_path.display()
            )));
        }

        let target = escape_make(&output_path.display().to_string());
        let entries: Vec<String> = deps
            .iter()
            .map(|dep| {
                let relative = pathdiff::diff_paths(dep, base).unwrap_or_else(|| dep.clone());
                escape_make(&relative.display().to_string())
            })
            .collect();

        let rule = format!("{}: {}\n", target, entries.join(" "));
        fs::write(deps_path, rule).map_err(|e| PipelineError::io(deps_path, e))
    }
}

fn escape_make(path: &str) -> String {
    path.replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_register_is_idempotent() {
        let mut deps = DependencySet::new();
        assert!(deps.register(Path::new("/tmp/a.scad")));
        assert!(!deps.register(Path::new("/tmp/a.scad")));
        assert!(deps.register(Path::new("/tmp/b.scad")));
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn test_write_is_deterministic() {
        let dir = tempdir().unwrap();
        let mut deps = DependencySet::new();
        deps.register(&dir.path().join("main.scad"));
        deps.register(&dir.path().join("lib.scad"));

        let first = dir.path().join("first.d");
        let second = dir.path().join("second.d");
        DependencyWriter::write(
            &first,
            Path::new("out.stl"),
            OutputFormat::Stl,
            dir.path(),
            &deps,
        )
        .unwrap();
        DependencyWriter::write(
            &second,
            Path::new("out.stl"),
            OutputFormat::Stl,
            dir.path(),
            &deps,
        )
        .unwrap();

        assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
        let rule = fs::read_to_string(&first).unwrap();
        assert_eq!(rule, "out.stl: main.scad lib.scad\n");
    }

    #[test]
    fn test_write_rejects_dump_formats() {
        let dir = tempdir().unwrap();
        let deps = DependencySet::new();
        let err = DependencyWriter::write(
            &dir.path().join("out.d"),
            Path::new("out.csg"),
            OutputFormat::Csg,
            dir.path(),
            &deps,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_paths_with_spaces_are_escaped() {
        let dir = tempdir().unwrap();
        let mut deps = DependencySet::new();
        deps.register(&dir.path().join("my part.scad"));

        let out = dir.path().join("out.d");
        DependencyWriter::write(
            &out,
            Path::new("out.stl"),
            OutputFormat::Stl,
            dir.path(),
            &deps,
        )
        .unwrap();
        let rule = fs::read_to_string(&out).unwrap();
        assert!(rule.contains("my\\ part.scad"));
    }
}
