//! Import of user-supplied key lists.
//!
//! The accepted format is a JSON array of objects:
//!
//! ```json
//! [
//!   { "name": "server.port", "description": "HTTP port" },
//!   { "name": "server.timeout.read" }
//! ]
//! ```
//!
//! Anything else is rejected as a whole; partial imports never reach the store.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::error::SettingsError;
use super::model::KeyEntry;

/// Extension accepted by the import command
pub const IMPORT_FILE_EXTENSION: &str = "json";

/// Parse and validate a JSON key list
pub fn parse_key_entries(content: &str) -> Result<Vec<KeyEntry>, SettingsError> {
    let entries: Vec<KeyEntry> = serde_json::from_str(content)
        .map_err(|source| SettingsError::MalformedImport { path: None, source })?;
    validate_entries(&entries)?;
    Ok(entries)
}

/// Read, parse and validate a JSON key list from disk
pub fn import_key_file(path: &Path) -> Result<Vec<KeyEntry>, SettingsError> {
    if path.extension().and_then(|e| e.to_str()) != Some(IMPORT_FILE_EXTENSION) {
        return Err(SettingsError::UnsupportedImport(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Read {} bytes from key file {:?}", content.len(), path);

    let entries = parse_key_entries(&content).map_err(|e| match e {
        SettingsError::MalformedImport { source, .. } => SettingsError::MalformedImport {
            path: Some(path.to_path_buf()),
            source,
        },
        other => other,
    })?;

    info!("Imported {} keys from {:?}", entries.len(), path);
    Ok(entries)
}

fn validate_entries(entries: &[KeyEntry]) -> Result<(), SettingsError> {
    for (index, entry) in entries.iter().enumerate() {
        if entry.name().trim().is_empty() {
            return Err(SettingsError::InvalidEntry {
                index,
                reason: "name must be a non-empty string".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    #[test]
    fn test_parse_valid_key_list() {
        let content = indoc! {r#"
            [
              { "name": "server.port", "description": "HTTP port" },
              { "name": "server.timeout.read" }
            ]
        "#};

        let entries = parse_key_entries(content).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].description(), Some("HTTP port"));
        assert!(!entries[1].has_description());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_key_entries(r#"{ "name": "server.port" }"#).unwrap_err();
        assert!(matches!(err, SettingsError::MalformedImport { .. }));
        assert!(err.is_import_error());
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        let err = parse_key_entries(r#"[ { "description": "orphan" } ]"#).unwrap_err();
        assert!(matches!(err, SettingsError::MalformedImport { .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_field_type() {
        let err = parse_key_entries(r#"[ { "name": 42 } ]"#).unwrap_err();
        assert!(matches!(err, SettingsError::MalformedImport { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let err = parse_key_entries(r#"[ { "name": "a" }, { "name": "  " } ]"#).unwrap_err();
        match err {
            SettingsError::InvalidEntry { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_import_file_attaches_path_to_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "not json").unwrap();

        match import_key_file(&path).unwrap_err() {
            SettingsError::MalformedImport { path: Some(p), .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_import_file_requires_json_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keys.txt");
        fs::write(&path, "[]").unwrap();

        assert!(import_key_file(&path).unwrap_err().is_import_error());
    }

    #[test]
    fn test_import_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = import_key_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
