// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Scoped change of the process working directory
//!
//! Relative paths inside a script resolve against the script's own directory,
//! while output paths resolve against the invoker's directory. The guard
//! captures the invoker's directory up front; `enter` moves into the script
//! directory and `restore` must run before any output file is opened. Drop
//! restores as a backstop so an error return cannot leak a changed directory.

use crate::error::PipelineError;
use std::cell::Cell;
use std::env;
use std::path::{Path, PathBuf};

pub struct WorkingDirectoryGuard {
    original: PathBuf,
    entered: Cell<bool>,
}

impl WorkingDirectoryGuard {
    /// Record the invoker's current directory
    pub fn capture() -> Result<Self, PipelineError> {
        let original = env::current_dir().map_err(|e| PipelineError::Path {
            path: PathBuf::from("."),
            source: e,
        })?;
        Ok(Self {
            original,
            entered: Cell::new(false),
        })
    }

    pub fn original(&self) -> &Path {
        &self.original
    }

    /// Change the process directory to `path`
    pub fn enter(&self, path: &Path) -> Result<(), PipelineError> {
        env::set_current_dir(path).map_err(|e| PipelineError::Path {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.entered.set(true);
        Ok(())
    }

    /// Change back to the directory recorded at capture time
    pub fn restore(&self) -> Result<(), PipelineError> {
        if !self.entered.get() {
            return Ok(());
        }
        env::set_current_dir(&self.original).map_err(|e| PipelineError::Path {
            path: self.original.clone(),
            source: e,
        })?;
        self.entered.set(false);
        Ok(())
    }
}

impl Drop for WorkingDirectoryGuard {
    fn drop(&mut self) {
        if self.entered.get() {
            let _ = env::set_current_dir(&self.original);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_enter_and_restore() {
        let dir = tempdir().unwrap();
        let guard = WorkingDirectoryGuard::capture().unwrap();
        let original = guard.original().to_path_buf();

        guard.enter(dir.path()).unwrap();
        assert_eq!(
            env::current_dir().unwrap(),
            std::fs::canonicalize(dir.path()).unwrap()
        );

        guard.restore().unwrap();
        assert_eq!(env::current_dir().unwrap(), original);
    }

    #[test]
    fn test_enter_missing_directory_fails() {
        let guard = WorkingDirectoryGuard::capture().unwrap();
        let err = guard.enter(Path::new("/nonexistent/directory")).unwrap_err();
        assert!(matches!(err, PipelineError::Path { .. }));
    }

    #[test]
    fn test_restore_without_enter_is_a_no_op() {
        let guard = WorkingDirectoryGuard::capture().unwrap();
        guard.restore().unwrap();
    }
}
