// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! I/O module - script loading and parsing

mod loader;
mod parser;

pub use loader::{LoadedScript, ScriptLoader};
pub use parser::parse_script;
