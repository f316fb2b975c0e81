//! Reader for the emulator's Qt settings file (`qt-config.ini`).
//!
//! Qt writes INI files with percent-encoded section names (`[Data%20Storage]`),
//! backslash sub-keys (`nand_directory\default=true`) and non-ASCII characters
//! escaped as `\xHHHH`. Only the pieces needed to recover user-data paths are
//! handled here.

use anyhow::{Context, Result};
use camino::Utf8Path;
use indexmap::IndexMap;
use regex::Regex;
use std::fs;
use std::sync::LazyLock;

/// Section holding the data-directory overrides.
pub const DATA_STORAGE_SECTION: &str = "Data Storage";

static SECTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[(.+)\]\s*$").expect("Invalid section regex"));
static ENTRY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^=;#]+?)\s*=\s*(.*?)\s*$").expect("Invalid entry regex"));

/// Raw `Data Storage` values; escapes are not decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataStorageConfig {
    pub nand_directory: Option<String>,
    pub load_directory: Option<String>,
}

impl DataStorageConfig {
    fn from_entries(entries: &IndexMap<String, String>) -> Self {
        Self {
            nand_directory: entries.get("nand_directory").cloned(),
            load_directory: entries.get("load_directory").cloned(),
        }
    }
}

/// Entries of `section` in `content`, keys lower-cased. `None` when the section is absent.
pub fn parse_section(content: &str, section: &str) -> Option<IndexMap<String, String>> {
    let mut in_section = false;
    let mut found = false;
    let mut entries = IndexMap::new();

    for line in content.lines() {
        let trimmed = line.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() || trimmed.starts_with(';') || trimmed.starts_with('#') {
            continue;
        }

        if let Some(caps) = SECTION_PATTERN.captures(trimmed) {
            in_section = decode_section_name(&caps[1]) == section;
            found |= in_section;
            continue;
        }

        if in_section {
            if let Some(caps) = ENTRY_PATTERN.captures(trimmed) {
                entries.insert(caps[1].to_lowercase(), caps[2].to_string());
            }
        }
    }

    found.then_some(entries)
}

/// Read the `Data Storage` section of the Qt config at `path`.
///
/// `Ok(None)` when the file has no such section.
pub fn read_data_storage(path: &Utf8Path) -> Result<Option<DataStorageConfig>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read Qt config: {}", path))?;

    let section = parse_section(&content, DATA_STORAGE_SECTION);
    if let Some(entries) = &section {
        tracing::debug!("{} entries: {:?}", DATA_STORAGE_SECTION, entries);
    }
    Ok(section.as_ref().map(DataStorageConfig::from_entries))
}

fn decode_section_name(raw: &str) -> String {
    raw.replace("%20", " ")
}

/// Decode a Qt INI value into a plain string.
///
/// Strips surrounding quotes, turns `\xHHHH` / `\uHHHH` into the character
/// and resolves the usual single-character escapes. Anything unrecognized is
/// kept verbatim.
pub fn decode_qt_value(raw: &str) -> String {
    let value = raw
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(raw);

    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some(marker @ ('x' | 'u')) => {
                chars.next();
                let mut hex = String::new();
                while hex.len() < 4 {
                    match chars.peek() {
                        Some(h) if h.is_ascii_hexdigit() => {
                            hex.push(*h);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if !hex.is_empty() => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(marker);
                        out.push_str(&hex);
                    }
                }
            }
            Some(simple @ ('\\' | '"' | '\'' | 'n' | 't' | 'r' | '0')) => {
                chars.next();
                out.push(match simple {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '0' => '\0',
                    other => other,
                });
            }
            _ => out.push('\\'),
        }
    }

    out
}
