// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Script loader
//!
//! Reads the primary script, expands `include <...>` lines relative to the
//! including file, appends command-line definitions, and registers every file
//! touched with the dependency tracker. Registration doubles as the cycle
//! guard: a file is only ever spliced in once.

use crate::error::PipelineError;
use crate::pipeline::DependencySet;
use std::fs;
use std::path::{Path, PathBuf};

/// A loaded script: composed source plus its document directory
#[derive(Debug)]
pub struct LoadedScript {
    pub source: String,
    pub document_dir: PathBuf,
    pub path: PathBuf,
}

pub struct ScriptLoader;

impl ScriptLoader {
    /// Load `path`, expand includes, and append `extra_definitions` verbatim
    /// after a newline. `extra_definitions` is pre-formatted by the caller as
    /// `name=value;` statements.
    pub fn load(
        path: &Path,
        extra_definitions: &str,
        deps: &mut DependencySet,
    ) -> Result<LoadedScript, PipelineError> {
        let absolute = fs::canonicalize(path).map_err(|e| PipelineError::io(path, e))?;
        let document_dir = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| absolute.clone());

        let mut source = load_expanded(&absolute, deps)?;
        source.push('\n');
        source.push_str(extra_definitions);

        Ok(LoadedScript {
            source,
            document_dir,
            path: absolute,
        })
    }
}

fn load_expanded(path: &Path, deps: &mut DependencySet) -> Result<String, PipelineError> {
    if !deps.register(path) {
        // Already spliced in; a second inclusion would loop
        return Ok(String::new());
    }

    let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        match include_target(line) {
            Some(target) => {
                let include_path = dir.join(target);
                let resolved = fs::canonicalize(&include_path)
                    .map_err(|e| PipelineError::io(&include_path, e))?;
                out.push_str(&load_expanded(&resolved, deps)?);
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }

    Ok(out)
}

fn include_target(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("include")?;
    let rest = rest.trim_start().strip_prefix('<')?;
    let end = rest.find('>')?;
    Some(&rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "{}", content).unwrap();
        path
    }

    #[test]
    fn test_load_registers_script_once() {
        let dir = tempdir().unwrap();
        let script = write_file(dir.path(), "main.scad", "cube(1);\n");

        let mut deps = DependencySet::new();
        let loaded = ScriptLoader::load(&script, "", &mut deps).unwrap();

        assert_eq!(deps.len(), 1);
        assert!(loaded.source.contains("cube(1);"));
        assert_eq!(loaded.document_dir, fs::canonicalize(dir.path()).unwrap());
    }

    #[test]
    fn test_definitions_are_appended() {
        let dir = tempdir().unwrap();
        let script = write_file(dir.path(), "main.scad", "cube(s);\n");

        let mut deps = DependencySet::new();
        let loaded = ScriptLoader::load(&script, "s=4;", &mut deps).unwrap();

        assert!(loaded.source.ends_with("s=4;"));
    }

    #[test]
    fn test_include_expansion_registers_both_files() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "lib.scad", "s = 3;\n");
        let script = write_file(dir.path(), "main.scad", "include <lib.scad>\ncube(s);\n");

        let mut deps = DependencySet::new();
        let loaded = ScriptLoader::load(&script, "", &mut deps).unwrap();

        assert_eq!(deps.len(), 2);
        assert!(loaded.source.contains("s = 3;"));
        assert!(loaded.source.contains("cube(s);"));
    }

    #[test]
    fn test_circular_include_terminates() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "a.scad", "include <b.scad>\ncube(1);\n");
        write_file(dir.path(), "b.scad", "include <a.scad>\nsphere(1);\n");
        let entry = dir.path().join("a.scad");

        let mut deps = DependencySet::new();
        let loaded = ScriptLoader::load(&entry, "", &mut deps).unwrap();

        assert_eq!(deps.len(), 2);
        assert!(loaded.source.contains("sphere(1);"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut deps = DependencySet::new();
        let err = ScriptLoader::load(Path::new("/nonexistent/input.scad"), "", &mut deps)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_missing_include_is_io_error() {
        let dir = tempdir().unwrap();
        let script = write_file(dir.path(), "main.scad", "include <missing.scad>\n");

        let mut deps = DependencySet::new();
        let err = ScriptLoader::load(&script, "", &mut deps).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }
}
