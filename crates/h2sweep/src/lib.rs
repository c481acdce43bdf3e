//! Post-test cleanup of embedded H2 database artifacts for Java projects.
//!
//! Test suites that boot an embedded H2 database leave `*.mv.db` and
//! `*.trace.db` files behind (typically under a `data/` directory). An
//! aborted run can leave them locked, which makes the next run fail before a
//! single test executes. This crate implements the cleanup step:
//!
//! - [`sweep_dir`] deletes matching artifacts directly under a data
//!   directory and reports what happened
//! - [`SweepGuard`] arms a sweep that runs on every exit path of a scope,
//!   including panics
//! - [`run_test_phase`] invokes a project's Maven/Gradle test command and
//!   always sweeps afterwards, whether or not the tests passed
//!
//! Deletion is best-effort: a file that is still locked is recorded in the
//! [`SweepReport`] and skipped, and the remaining artifacts are still
//! processed. The sweep is hygiene, not a correctness gate, so it never
//! changes the outcome of the test run it finalizes.

mod config;
mod error;
mod guard;
mod runner;
mod sweep;

pub use config::{data_dir, SweepConfig, DATA_DIR_ENV, DEFAULT_DATA_DIR_NAME};
pub use error::SweepError;
pub use guard::SweepGuard;
pub use runner::{
    detect_build_tool, run_test_phase, BuildTool, CommandRunner, DefaultCommandRunner,
    TestPhaseOutcome, TestPhaseRequest,
};
pub use sweep::{
    enumerate_artifacts, is_database_artifact, sweep_dir, ArtifactInfo, SweepFailure, SweepReport,
    ARTIFACT_SUFFIXES,
};

pub type Result<T> = std::result::Result<T, SweepError>;
