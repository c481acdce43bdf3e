use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use h2sweep::{
    data_dir, enumerate_artifacts, run_test_phase, sweep_dir, BuildTool, DefaultCommandRunner,
    SweepConfig, SweepReport, TestPhaseRequest,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "h2sweep",
    version,
    about = "Cleanup of embedded H2 database files left behind by Java test runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Delete leftover `*.mv.db` / `*.trace.db` files from the data directory
    Sweep(SweepArgs),
    /// List matching database files without deleting anything
    List(ListArgs),
    /// Run the project's build-tool tests with the sweep as an unconditional finalizer
    Test(TestArgs),
}

#[derive(Args)]
struct SweepArgs {
    /// Project root (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
    /// Directory to sweep (defaults to `<path>/data`; `H2SWEEP_DATA_DIR` also overrides)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ListArgs {
    /// Project root (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
    /// Directory to inspect (defaults to `<path>/data`; `H2SWEEP_DATA_DIR` also overrides)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TestArgs {
    /// Project root (defaults to current directory)
    #[arg(long, default_value = ".")]
    path: PathBuf,
    /// Directory to sweep afterwards (defaults to `<path>/data`)
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Build tool to invoke (auto-detected by default)
    #[arg(long, value_enum, default_value_t = ToolArg::Auto)]
    tool: ToolArg,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
    /// Test name filters forwarded to the build tool
    tests: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ToolArg {
    Auto,
    Maven,
    Gradle,
}

impl From<ToolArg> for BuildTool {
    fn from(tool: ToolArg) -> Self {
        match tool {
            ToolArg::Auto => BuildTool::Auto,
            ToolArg::Maven => BuildTool::Maven,
            ToolArg::Gradle => BuildTool::Gradle,
        }
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing() {
    // Diagnostics go to stderr so stdout stays machine-readable under --json.
    let filter = tracing_subscriber::EnvFilter::try_from_env("H2SWEEP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Sweep(args) => {
            let config = sweep_config(args.data_dir);
            let dir = data_dir(&args.path, &config);
            tracing::debug!(target: "h2sweep.cli", data_dir = %dir.display(), "sweeping");
            let report = sweep_dir(&dir)?;
            print_report(&report, args.json)?;
            Ok(0)
        }
        Command::List(args) => {
            let config = sweep_config(args.data_dir);
            let dir = data_dir(&args.path, &config);
            let artifacts = enumerate_artifacts(&dir)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&artifacts)?);
            } else {
                for artifact in &artifacts {
                    println!("{} ({} bytes)", artifact.path.display(), artifact.size_bytes);
                }
                println!("found {} database artifact(s)", artifacts.len());
            }
            Ok(0)
        }
        Command::Test(args) => {
            let config = sweep_config(args.data_dir);
            let request = TestPhaseRequest {
                build_tool: args.tool.into(),
                tests: args.tests,
            };
            let outcome =
                run_test_phase(&args.path, &request, &config, &DefaultCommandRunner)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "tests: {} (exit code {})",
                    if outcome.tests_passed { "passed" } else { "failed" },
                    outcome.exit_code
                );
                print_report(&outcome.sweep, false)?;
            }
            // The sweep never changes the test outcome; pipelines see the
            // test command's exit code.
            if outcome.tests_passed {
                Ok(0)
            } else if outcome.exit_code > 0 {
                Ok(outcome.exit_code)
            } else {
                Ok(1)
            }
        }
    }
}

fn sweep_config(data_dir_flag: Option<PathBuf>) -> SweepConfig {
    match data_dir_flag {
        Some(dir) => SweepConfig {
            data_dir_override: Some(dir),
        },
        None => SweepConfig::from_env(),
    }
}

fn print_report(report: &SweepReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for artifact in &report.deleted {
        println!("deleted: {}", artifact.path.display());
    }
    for failure in &report.failed {
        println!(
            "failed: {} ({})",
            failure.artifact.path.display(),
            failure.error
        );
    }
    println!("cleaned up H2 database files");
    Ok(())
}
