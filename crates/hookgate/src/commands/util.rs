//! Shared helpers for command handlers.

use std::path::Path;

use chrono::{DateTime, Utc};
use hookgate_api::Pagination;

use crate::cli::PageArgs;
use crate::error::CliError;

/// Refuse destructive operations unless `--yes` was passed.
pub fn require_confirmation(action: &str, yes_flag: bool) -> Result<(), CliError> {
    if yes_flag {
        return Ok(());
    }
    Err(CliError::ConfirmationRequired {
        action: action.into(),
    })
}

/// Read and parse a JSON file for `--file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::validation("file", format!("invalid JSON: {e}")))
}

pub fn parse_json(raw: &str, field: &str) -> Result<serde_json::Value, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::validation(field, format!("invalid JSON: {e}")))
}

/// `NAME:VALUE` header flag.
pub fn parse_header(raw: &str) -> Result<(String, String), CliError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::validation("header", format!("expected NAME:VALUE, got '{raw}'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::validation("header", format!("missing name in '{raw}'")));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

pub fn parse_time(value: &str, field: &str) -> Result<DateTime<Utc>, CliError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CliError::validation(field, format!("invalid timestamp '{value}' (use RFC3339)")))
}

pub fn page(args: PageArgs) -> Pagination {
    Pagination::new(args.limit, args.offset)
}
