//! One-shot YAML snapshot of a finished report, for audit and debugging

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use scout_core::{CompanyResearch, ScoutError, ScoutResult};
use tracing::info;

pub const DEFAULT_SNAPSHOT_PATH: &str = "research_results.yaml";

pub fn to_yaml(report: &CompanyResearch) -> ScoutResult<String> {
    serde_yaml::to_string(report)
        .map_err(|e| ScoutError::internal(format!("Failed to serialize report: {}", e)))
}

/// Replace `path` with the report as YAML
///
/// The YAML goes to a sibling temp file that is then renamed over `path`,
/// so concurrent writers never interleave and readers see either the old or
/// the new report.
pub async fn write_snapshot(report: &CompanyResearch, path: &Path) -> ScoutResult<()> {
    let yaml = to_yaml(report)?;
    let staging = staging_path(path);

    let result = async {
        tokio::fs::write(&staging, yaml).await?;
        tokio::fs::rename(&staging, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(ScoutError::internal(format!(
            "Failed to write snapshot {}: {}",
            path.display(),
            e
        )));
    }

    info!("Research complete. Results saved to {}", path.display());
    Ok(())
}

/// Unique temp file next to `path`, on the same filesystem for the rename
fn staging_path(path: &Path) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.to_string());
    let staging_name = format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    );
    path.with_file_name(staging_name)
}
