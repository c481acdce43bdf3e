use crate::sweep::{sweep_dir, SweepReport};
use std::path::{Path, PathBuf};

/// Sweeps a data directory when it leaves scope.
///
/// This is the in-process equivalent of wiring the cleanup as a build-tool
/// finalizer: the sweep runs on every exit path, including early returns and
/// panics. Call [`SweepGuard::finish`] on the normal path to run the sweep
/// eagerly and get the report back.
#[derive(Debug)]
pub struct SweepGuard {
    data_dir: PathBuf,
    armed: bool,
}

impl SweepGuard {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            armed: true,
        }
    }

    /// Directory this guard will sweep.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Sweep now and return the report, disarming the drop-path sweep.
    pub fn finish(mut self) -> crate::Result<SweepReport> {
        self.armed = false;
        sweep_dir(&self.data_dir)
    }
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Must not panic out of drop; an unreadable directory is logged and
        // left alone.
        match sweep_dir(&self.data_dir) {
            Ok(report) => {
                tracing::debug!(
                    target: "h2sweep.sweep",
                    data_dir = %self.data_dir.display(),
                    deleted = report.deleted_count(),
                    failed = report.failed.len(),
                    "swept database artifacts on scope exit"
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "h2sweep.sweep",
                    data_dir = %self.data_dir.display(),
                    error = %err,
                    "failed to sweep database artifacts on scope exit"
                );
            }
        }
    }
}
