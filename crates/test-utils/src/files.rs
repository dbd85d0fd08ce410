//! Temporary files for loader tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// Write `contents` to a fresh temporary file with the given suffix.
///
/// The file is removed when the returned handle is dropped.
pub fn temp_file_with(contents: &str, suffix: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// Serialize `value` as JSON into a temporary `.json` file.
pub fn temp_json<T: serde::Serialize>(value: &T) -> std::io::Result<NamedTempFile> {
    let json = serde_json::to_string_pretty(value)?;
    temp_file_with(&json, ".json")
}
