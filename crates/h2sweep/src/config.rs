use std::path::{Path, PathBuf};

/// Environment variable overriding the swept data directory.
pub const DATA_DIR_ENV: &str = "H2SWEEP_DATA_DIR";

/// Directory name H2 artifacts are expected under when no override is set.
pub const DEFAULT_DATA_DIR_NAME: &str = "data";

/// Configuration for selecting the on-disk data directory to sweep.
#[derive(Clone, Debug, Default)]
pub struct SweepConfig {
    /// Override the swept directory. Relative paths are resolved against the
    /// project root.
    pub data_dir_override: Option<PathBuf>,
}

impl SweepConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir_override: std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
        }
    }
}

/// Returns the directory to sweep for `project_root`, honoring `SweepConfig`
/// (and therefore `H2SWEEP_DATA_DIR`).
pub fn data_dir(project_root: impl AsRef<Path>, config: &SweepConfig) -> PathBuf {
    let project_root = project_root.as_ref();
    match &config.data_dir_override {
        Some(dir) if dir.is_absolute() => dir.clone(),
        Some(dir) => project_root.join(dir),
        None => project_root.join(DEFAULT_DATA_DIR_NAME),
    }
}
