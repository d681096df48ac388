//! Run manifest sidecar (`X.manifest.json` next to `X.json`).

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use wordroots_shared::{Result, WordrootsError};

use crate::{SaveSummary, write_atomic};

/// Schema version for forward compatibility.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Record of one run that wrote the knowledge base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    /// Time-sortable run identifier.
    pub run_id: Uuid,
    /// Version of the tool that wrote the file.
    pub tool_version: String,
    pub created_at: DateTime<Utc>,
    /// Steps run, in order (`extract`, `derive`, `inflect`).
    pub steps: Vec<String>,
    pub entry_count: usize,
    pub vocabulary_size: usize,
    /// Hex SHA-256 of the knowledge base file as written.
    pub sha256: String,
}

impl RunManifest {
    /// Describe a completed save.
    pub fn new(
        tool_version: impl Into<String>,
        steps: &[&str],
        saved: &SaveSummary,
        vocabulary_size: usize,
    ) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            run_id: Uuid::now_v7(),
            tool_version: tool_version.into(),
            created_at: Utc::now(),
            steps: steps.iter().map(|s| (*s).to_string()).collect(),
            entry_count: saved.entries,
            vocabulary_size,
            sha256: saved.sha256.clone(),
        }
    }
}

/// `etymology.json` → `etymology.manifest.json`; other names get the suffix appended.
pub fn manifest_path_for(path: &Path) -> PathBuf {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        path.with_extension("manifest.json")
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".manifest.json");
        PathBuf::from(name)
    }
}

/// Write the manifest for the knowledge base at `records_path`.
pub fn write_manifest(records_path: &Path, manifest: &RunManifest) -> Result<PathBuf> {
    let path = manifest_path_for(records_path);
    let mut json = serde_json::to_string_pretty(manifest).map_err(|e| {
        WordrootsError::Storage(format!("manifest serialization failed: {e}"))
    })?;
    json.push('\n');

    write_atomic(&path, json.as_bytes())?;
    debug!(path = %path.display(), run_id = %manifest.run_id, "wrote run manifest");
    Ok(path)
}

/// Read the manifest for the knowledge base at `records_path`.
pub fn read_manifest(records_path: &Path) -> Result<RunManifest> {
    let path = manifest_path_for(records_path);
    if !path.exists() {
        return Err(WordrootsError::missing_input(path));
    }

    let content = std::fs::read_to_string(&path).map_err(|e| WordrootsError::io(&path, e))?;
    let manifest: RunManifest = serde_json::from_str(&content).map_err(|e| {
        WordrootsError::validation(format!("invalid manifest {}: {e}", path.display()))
    })?;

    if manifest.schema_version != MANIFEST_SCHEMA_VERSION {
        return Err(WordrootsError::validation(format!(
            "unsupported manifest schema version {} (expected {MANIFEST_SCHEMA_VERSION})",
            manifest.schema_version
        )));
    }
    Ok(manifest)
}
