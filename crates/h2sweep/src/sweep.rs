use crate::error::SweepError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File-name suffixes H2 uses for its on-disk artifacts.
///
/// `*.mv.db` is the MVStore data file and `*.trace.db` the trace log. Both
/// can be left behind (and locked) by an aborted test JVM.
pub const ARTIFACT_SUFFIXES: [&str; 2] = [".mv.db", ".trace.db"];

/// Returns `true` when `file_name` names an H2 database artifact.
///
/// Matching is byte-wise and case-sensitive, so `notes.mv.dbx` and
/// `upper.MV.DB` do not match.
pub fn is_database_artifact(file_name: &str) -> bool {
    ARTIFACT_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

/// A single database artifact found directly under the data directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ArtifactInfo {
    /// File name directly under the data directory.
    pub name: String,
    /// Full on-disk path.
    pub path: PathBuf,
    /// Best-effort size on disk (bytes).
    pub size_bytes: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    pub artifact: ArtifactInfo,
    pub error: String,
}

/// Result summary from a sweep run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub data_dir: PathBuf,
    pub deleted: Vec<ArtifactInfo>,
    pub failed: Vec<SweepFailure>,
    /// Best-effort number of bytes freed (sum of `size_bytes` for deleted artifacts).
    pub deleted_bytes: u64,
}

impl SweepReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }

    /// `true` when every matched artifact was removed.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Enumerate H2 artifacts directly under `data_dir`.
///
/// A missing directory yields an empty list. Matching is top-level-only:
/// subdirectories are skipped and symlinks are never followed when inspecting
/// entries. Per-entry errors are logged and skipped, since artifacts can race
/// with concurrent deletion.
pub fn enumerate_artifacts(data_dir: impl AsRef<Path>) -> Result<Vec<ArtifactInfo>, SweepError> {
    let data_dir = data_dir.as_ref();
    let entries = match std::fs::read_dir(data_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };

    let mut artifacts = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(
                    target: "h2sweep.sweep",
                    data_dir = %data_dir.display(),
                    error = %err,
                    "failed to read data directory entry while enumerating artifacts"
                );
                continue;
            }
        };

        let name_os = entry.file_name();
        // Non-UTF-8 names cannot match either suffix.
        let Some(name) = name_os.to_str() else {
            continue;
        };
        if !is_database_artifact(name) {
            continue;
        }

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(
                        target: "h2sweep.sweep",
                        path = %entry.path().display(),
                        error = %err,
                        "failed to read entry file type while enumerating artifacts"
                    );
                }
                continue;
            }
        };
        // A symlink with a matching name is removed as the link itself, never
        // through its target.
        if !(file_type.is_file() || file_type.is_symlink()) {
            continue;
        }

        let path = entry.path();
        let size_bytes = match std::fs::symlink_metadata(&path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
            Err(err) => {
                tracing::debug!(
                    target: "h2sweep.sweep",
                    path = %path.display(),
                    error = %err,
                    "failed to stat artifact while enumerating"
                );
                0
            }
        };

        artifacts.push(ArtifactInfo {
            name: name.to_string(),
            path,
            size_bytes,
        });
    }

    // Deterministic ordering.
    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}

/// Delete H2 artifacts directly under `data_dir`.
///
/// Deletion is best-effort: a file that cannot be removed (typically still
/// locked by a database engine) is logged, recorded in `failed`, and skipped;
/// the remaining artifacts are still processed. An artifact that disappears
/// between enumeration and deletion counts as deleted. `Err` is returned only
/// when the directory itself cannot be read.
pub fn sweep_dir(data_dir: impl AsRef<Path>) -> Result<SweepReport, SweepError> {
    let data_dir = data_dir.as_ref();
    let artifacts = enumerate_artifacts(data_dir)?;

    let mut report = SweepReport {
        data_dir: data_dir.to_path_buf(),
        deleted: Vec::new(),
        failed: Vec::new(),
        deleted_bytes: 0,
    };

    for artifact in artifacts {
        match std::fs::remove_file(&artifact.path) {
            Ok(()) => {
                tracing::debug!(
                    target: "h2sweep.sweep",
                    path = %artifact.path.display(),
                    "deleted database artifact"
                );
                report.deleted_bytes = report.deleted_bytes.saturating_add(artifact.size_bytes);
                report.deleted.push(artifact);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                // Raced with another deletion; already gone.
                report.deleted_bytes = report.deleted_bytes.saturating_add(artifact.size_bytes);
                report.deleted.push(artifact);
            }
            Err(err) => {
                tracing::warn!(
                    target: "h2sweep.sweep",
                    path = %artifact.path.display(),
                    error = %err,
                    "failed to delete database artifact (best effort)"
                );
                report.failed.push(SweepFailure {
                    artifact,
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(report)
}
