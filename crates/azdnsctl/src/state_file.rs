//! JSON state file for one AAAA record set
//!
//! Writes go to a temporary file first and are renamed into place, so a
//! crash never leaves a half-written state file behind.

use anyhow::{Context, Result};
use azdns_core::AaaaRecordState;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Load a record state from `path`
pub async fn load(path: &Path) -> Result<AaaaRecordState> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read state file {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse state file {}", path.display()))
}

/// Write a record state to `path` atomically
pub async fn save(path: &Path, state: &AaaaRecordState) -> Result<()> {
    let json = serde_json::to_string_pretty(state).context("Failed to serialize state")?;

    let temp_path = temp_path(path);
    {
        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("Failed to create temp file {}", temp_path.display()))?;
        file.write_all(json.as_bytes())
            .await
            .with_context(|| format!("Failed to write to temp file {}", temp_path.display()))?;
        file.write_all(b"\n").await?;
        file.flush()
            .await
            .with_context(|| format!("Failed to flush temp file {}", temp_path.display()))?;
    }

    fs::rename(&temp_path, path).await.with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    tracing::trace!("State written to file: {}", path.display());
    Ok(())
}

/// Sibling of `path` with `.tmp` appended to the full file name
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
