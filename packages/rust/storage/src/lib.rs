//! Knowledge-base persistence.
//!
//! The knowledge base is stored as a single JSON object mapping each word to
//! its sorted list of `"language:word"` descriptors. Output is deterministic
//! (sorted keys, 2-space indent) so that successive runs diff cleanly, and
//! every write goes through a temp file plus rename.
//!
//! A [`RunManifest`] sidecar records what produced the file.

mod manifest;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use wordroots_shared::{EtymologyRecords, Result, WordrootsError};

pub use manifest::{MANIFEST_SCHEMA_VERSION, RunManifest, manifest_path_for, read_manifest, write_manifest};

/// What a save wrote to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the bytes written.
    pub sha256: String,
}

/// Load a persisted knowledge base.
///
/// A missing file is an empty base, so the first run of any step starts from
/// nothing.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_records(path: &Path) -> Result<EtymologyRecords> {
    if !path.exists() {
        debug!("knowledge base file not found, starting empty");
        return Ok(EtymologyRecords::new());
    }

    let content = std::fs::read_to_string(path).map_err(|e| WordrootsError::io(path, e))?;
    let records: EtymologyRecords = serde_json::from_str(&content).map_err(|e| {
        WordrootsError::parse(format!("invalid knowledge base {}: {e}", path.display()))
    })?;

    info!(entries = records.len(), "loaded knowledge base");
    Ok(records)
}

/// Save a knowledge base atomically.
#[instrument(skip_all, fields(path = %path.display(), entries = records.len()))]
pub fn save_records(path: &Path, records: &EtymologyRecords) -> Result<SaveSummary> {
    let mut json = serde_json::to_string_pretty(records).map_err(|e| {
        WordrootsError::Storage(format!("knowledge base serialization failed: {e}"))
    })?;
    json.push('\n');

    write_atomic(path, json.as_bytes())?;

    let summary = SaveSummary {
        path: path.to_path_buf(),
        entries: records.len(),
        bytes: json.len(),
        sha256: sha256_hex(json.as_bytes()),
    };
    info!(bytes = summary.bytes, "saved knowledge base");
    Ok(summary)
}

/// Write to a sibling temp file, then rename over the target.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        WordrootsError::Storage(format!("output path has no file name: {}", path.display()))
    })?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| WordrootsError::io(&dir, e))?;

    let temp = dir.join(format!(".{file_name}.tmp"));
    std::fs::write(&temp, content).map_err(|e| WordrootsError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| WordrootsError::io(path, e))?;

    debug!(path = %path.display(), size = content.len(), "wrote file");
    Ok(())
}

fn sha256_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "wordroots-storage-test-{}",
            uuid::Uuid::now_v7()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_records() -> EtymologyRecords {
        let mut records = EtymologyRecords::new();
        records.insert("NATION".into(), vec!["latin:natio".into(), "old_french:nacion".into()]);
        records.insert("FIX".into(), vec!["latin:fixus".into()]);
        records
    }

    #[test]
    fn missing_file_loads_empty() {
        let records = load_records(Path::new("/definitely/not/etymology.json")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn save_then_load_preserves_records() {
        let dir = temp_dir();
        let path = dir.join("etymology.json");

        let summary = save_records(&path, &sample_records()).unwrap();
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.sha256.len(), 64);

        assert_eq!(load_records(&path).unwrap(), sample_records());
        assert!(!dir.join(".etymology.json.tmp").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn output_is_sorted_and_indented() {
        let dir = temp_dir();
        let path = dir.join("etymology.json");
        save_records(&path, &sample_records()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let expected = "{\n  \"FIX\": [\n    \"latin:fixus\"\n  ],\n  \"NATION\": [\n    \"latin:natio\",\n    \"old_french:nacion\"\n  ]\n}\n";
        assert_eq!(content, expected);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn identical_records_hash_identically() {
        let dir = temp_dir();
        let first = save_records(&dir.join("a.json"), &sample_records()).unwrap();
        let second = save_records(&dir.join("b.json"), &sample_records()).unwrap();
        assert_eq!(first.sha256, second.sha256);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = temp_dir();
        let path = dir.join("nested/out/etymology.json");
        save_records(&path, &sample_records()).unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = temp_dir();
        let path = dir.join("broken.json");
        std::fs::write(&path, "{\"FIX\": \"latin:fixus\"}").unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, WordrootsError::Parse { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
