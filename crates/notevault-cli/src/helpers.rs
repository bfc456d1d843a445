//! Input helpers for the CLI.

use std::io::{self, IsTerminal, Read};

use crate::errors::CliError;

/// Parse a note id argument.
pub fn parse_note_id(value: &str) -> Result<i64, CliError> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CliError::invalid_input(format!("Invalid note ID: {}", value)))
}

/// Titles must contain something besides whitespace.
pub fn validate_title(title: &str) -> Result<(), CliError> {
    if title.trim().is_empty() {
        return Err(CliError::invalid_input("Title must not be empty"));
    }
    Ok(())
}

/// Use the flag value if given, otherwise read piped stdin.
///
/// An interactive terminal with no flag yields empty content.
pub fn read_content(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(content) = flag {
        return Ok(content);
    }
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
    Ok(buffer.trim_end_matches('\n').to_string())
}
