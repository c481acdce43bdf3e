use crate::config::{data_dir, SweepConfig};
use crate::error::SweepError;
use crate::sweep::{sweep_dir, SweepReport};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Build tool used to run the project's tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildTool {
    /// Auto-detect based on project files (`pom.xml`, `build.gradle`, `build.gradle.kts`).
    #[default]
    Auto,
    Maven,
    Gradle,
}

/// Request to run a project's test phase with a guaranteed sweep afterwards.
#[derive(Debug, Clone, Default)]
pub struct TestPhaseRequest {
    pub build_tool: BuildTool,
    /// Test name filters forwarded to the build tool (`-Dtest=` for Maven,
    /// `--tests` for Gradle). Empty means the full suite.
    pub tests: Vec<String>,
}

/// Outcome of the test command plus the finalizing sweep.
#[derive(Debug, Clone, Serialize)]
pub struct TestPhaseOutcome {
    pub tool: BuildTool,
    /// Exit code of the test command (`-1` when terminated by a signal).
    pub exit_code: i32,
    pub tests_passed: bool,
    pub sweep: SweepReport,
}

pub trait CommandRunner: Send + Sync + std::fmt::Debug {
    fn run(&self, cwd: &Path, program: &Path, args: &[String]) -> io::Result<ExitStatus>;
}

/// Spawns the test command with inherited stdio so build-tool output streams
/// straight through to the user.
#[derive(Debug, Clone, Default)]
pub struct DefaultCommandRunner;

impl CommandRunner for DefaultCommandRunner {
    fn run(&self, cwd: &Path, program: &Path, args: &[String]) -> io::Result<ExitStatus> {
        Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .status()
    }
}

/// Detect the build tool for `project_root` from its build files.
pub fn detect_build_tool(project_root: &Path) -> Result<BuildTool, SweepError> {
    if project_root.join("pom.xml").exists() {
        return Ok(BuildTool::Maven);
    }
    if project_root.join("build.gradle").exists() || project_root.join("build.gradle.kts").exists()
    {
        return Ok(BuildTool::Gradle);
    }
    Err(SweepError::UnsupportedBuildTool(
        project_root.display().to_string(),
    ))
}

fn command_for_tests(
    project_root: &Path,
    tool: BuildTool,
    tests: &[String],
) -> (PathBuf, Vec<String>) {
    match tool {
        BuildTool::Maven => {
            let mvnw = project_root.join("mvnw");
            let program = if mvnw.exists() { "./mvnw" } else { "mvn" };

            let mut args = Vec::new();
            if !tests.is_empty() {
                args.push(format!("-Dtest={}", tests.join(",")));
            }
            args.push("test".to_string());
            (PathBuf::from(program), args)
        }
        BuildTool::Gradle => {
            let gradlew = project_root.join("gradlew");
            let program = if gradlew.exists() { "./gradlew" } else { "gradle" };

            let mut args = vec!["test".to_string()];
            for test in tests {
                args.push("--tests".to_string());
                args.push(test.replace('#', "."));
            }
            (PathBuf::from(program), args)
        }
        BuildTool::Auto => unreachable!("auto must be resolved before command construction"),
    }
}

/// Run the project's test command, then sweep the configured data directory.
///
/// The sweep runs unconditionally after the test command: on success, on test
/// failure, and on spawn failure (the error is propagated only after the sweep
/// was attempted). A failing test suite is not an error of this function; it
/// is reported through `exit_code` / `tests_passed` so callers can still
/// propagate the test outcome.
pub fn run_test_phase(
    project_root: impl AsRef<Path>,
    request: &TestPhaseRequest,
    config: &SweepConfig,
    runner: &dyn CommandRunner,
) -> crate::Result<TestPhaseOutcome> {
    let project_root = project_root.as_ref();
    let project_root = project_root
        .canonicalize()
        .unwrap_or_else(|_| project_root.to_path_buf());

    let tool = match request.build_tool {
        BuildTool::Auto => detect_build_tool(&project_root)?,
        other => other,
    };

    let (program, args) = command_for_tests(&project_root, tool, &request.tests);
    tracing::debug!(
        target: "h2sweep.runner",
        project_root = %project_root.display(),
        command = %format_command(&program, &args),
        "running test command"
    );
    let run_result = runner.run(&project_root, &program, &args);

    let swept_dir = data_dir(&project_root, config);
    let sweep_result = sweep_dir(&swept_dir);

    let status = match run_result {
        Ok(status) => status,
        Err(source) => {
            // The sweep above already ran; a spawn failure must not skip it.
            return Err(SweepError::Command {
                command: format_command(&program, &args),
                source,
            });
        }
    };
    let sweep = sweep_result?;

    Ok(TestPhaseOutcome {
        tool,
        exit_code: status.code().unwrap_or(-1),
        tests_passed: status.success(),
        sweep,
    })
}

pub(crate) fn format_command(program: &Path, args: &[String]) -> String {
    let mut out = program.to_string_lossy().to_string();
    for arg in args {
        out.push(' ');
        out.push_str(arg);
    }
    out
}
