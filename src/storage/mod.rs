//! Flat-file storage -- lenient JSON reads, atomic key-sorted JSON writes.
//!
//! Every scoreboard artifact (`report.json`, `trend.json`, `pip-list.json`,
//! `config.json`) is a plain JSON file. Inputs are read leniently: a missing
//! or broken file is logged and treated as absent. Outputs are written to a
//! temporary file next to the destination and renamed into place.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Indentation used for every JSON file the scoreboard writes.
const JSON_INDENT: &[u8] = b"    ";

/// Read and decode a JSON file, returning `None` if it is missing or malformed.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "input file not readable");
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "input file is not valid JSON");
            None
        }
    }
}

/// Encode `value` as key-sorted JSON with four-space indentation.
pub fn to_sorted_json<T: Serialize>(value: &T) -> Result<String> {
    // Going through `Value` sorts object keys (serde_json's map is a BTreeMap).
    let value = serde_json::to_value(value).context("failed to encode value as JSON")?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .context("failed to format JSON document")?;

    String::from_utf8(buf).context("JSON output is not UTF-8")
}

/// Write `value` to `path` as key-sorted, indented JSON.
///
/// The document goes to a temporary file in the same directory first, so a
/// reader never observes a half-written file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let document = to_sorted_json(value)?;
    write_atomic(path, document.as_bytes())
}

/// Replace the contents of `path` with `bytes` via write-then-rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to replace {}", path.display()))?;

    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}
