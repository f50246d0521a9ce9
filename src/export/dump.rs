// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Solidcast Team

//! Textual dump writers: boolean terms, AST, captured echo output

use crate::ast::ScriptModule;
use crate::csg::Term;
use anyhow::Result;
use std::io::Write;

const NO_TERM_MESSAGE: &str = "No top-level CSG object";

/// Raw infix term dump
pub fn write_term_raw<W: Write>(term: Option<&Term>, writer: &mut W) -> Result<()> {
    match term {
        Some(term) => writeln!(writer, "{}", term.dump())?,
        None => writeln!(writer, "{}", NO_TERM_MESSAGE)?,
    }
    Ok(())
}

/// Script-shaped term dump
pub fn write_term_script<W: Write>(term: Option<&Term>, writer: &mut W) -> Result<()> {
    match term {
        Some(term) => write!(writer, "{}", term.dump_script())?,
        None => writeln!(writer, "{}", NO_TERM_MESSAGE)?,
    }
    Ok(())
}

/// Untouched syntactic module as pretty JSON
pub fn write_ast<W: Write>(module: &ScriptModule, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, module)?;
    writeln!(writer)?;
    Ok(())
}

/// Captured echo lines
pub fn write_echo<W: Write>(echoes: &[String], writer: &mut W) -> Result<()> {
    for line in echoes {
        writeln!(writer, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::parse_script;

    #[test]
    fn test_missing_term_message() {
        let mut buffer = Vec::new();
        write_term_raw(None, &mut buffer).unwrap();
        assert_eq!(buffer, b"No top-level CSG object\n");
    }

    #[test]
    fn test_ast_dump_is_json() {
        let module = parse_script("cube(1);").unwrap();
        let mut buffer = Vec::new();
        write_ast(&module, &mut buffer).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert!(value.get("statements").is_some());
    }

    #[test]
    fn test_echo_lines() {
        let mut buffer = Vec::new();
        write_echo(
            &["ECHO: 1".to_string(), "ECHO: \"x\"".to_string()],
            &mut buffer,
        )
        .unwrap();
        assert_eq!(buffer, b"ECHO: 1\nECHO: \"x\"\n");
    }
}
