//! `KEY=VALUE` file format
//!
//! One record per line. Blank lines, `#` comments and an optional `export `
//! prefix are tolerated on read and preserved on update. Values are not
//! escaped, so a value can never span lines.

use crate::error::{CredentialError, Result};

/// Marks a value holding an encoded `EncryptedSecret`
pub const ENCRYPTED_PREFIX: &str = "enc:";

/// One record of the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
}

impl ConfigEntry {
    pub fn is_encrypted(&self) -> bool {
        self.value.starts_with(ENCRYPTED_PREFIX)
    }
}

/// Parse a single line; `None` for blanks, comments and lines without `=`
pub fn parse_line(line: &str) -> Option<ConfigEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);

    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some(ConfigEntry {
        key: key.to_string(),
        value: unquote(value.trim()).to_string(),
    })
}

/// All records in file order, duplicates included
pub fn parse(contents: &str) -> Vec<ConfigEntry> {
    contents.lines().filter_map(parse_line).collect()
}

/// Replace the first record for `key` or append one, leaving every other line
/// untouched
pub fn upsert(contents: &str, key: &str, value: &str) -> String {
    let record = format!("{}={}", key, value);
    let mut lines: Vec<String> = contents.lines().map(str::to_string).collect();

    match lines
        .iter()
        .position(|line| parse_line(line).is_some_and(|entry| entry.key == key))
    {
        Some(index) => lines[index] = record,
        None => lines.push(record),
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Reject records the format cannot represent
pub fn validate_entry(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CredentialError::InvalidEntry("key is empty".to_string()));
    }
    if key.starts_with('#') || key.contains('=') || key.chars().any(char::is_whitespace) {
        return Err(CredentialError::InvalidEntry(format!(
            "key {:?} may not contain '=', whitespace or start with '#'",
            key
        )));
    }
    if value.contains('\n') || value.contains('\r') {
        return Err(CredentialError::InvalidEntry(format!(
            "value for {} contains a line break; multi-line values are not supported",
            key
        )));
    }
    if value.trim() != value || unquote(value) != value {
        return Err(CredentialError::InvalidEntry(format!(
            "value for {} has surrounding whitespace or quotes that would be stripped on read",
            key
        )));
    }
    Ok(())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
