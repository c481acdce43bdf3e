/// Errors produced by artifact sweeps and test-phase orchestration.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported build tool for project at {0}")]
    UnsupportedBuildTool(String),

    #[error("failed to run `{command}`: {source}")]
    Command {
        command: String,
        source: std::io::Error,
    },
}
