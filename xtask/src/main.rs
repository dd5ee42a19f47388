use std::fs;
use std::io::{self, Seek, Write};
use std::path::{Path, PathBuf};
use std::process::{exit, Command};

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{json, Value};
use smartroom_functions_core::config::{ConfigError, FunctionsConfig, MAX_INSTANCES_ENV};
use smartroom_functions_core::registry::FunctionName;
use thiserror::Error;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

const LAMBDA_PACKAGE: &str = "smartroom_functions_lambda";
const RUNTIME_BINARY: &str = "functions_runtime";
const DIST_DIR: &str = "dist";
const MANIFEST_FILE: &str = "functions_manifest.json";

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the SmartRoom functions workspace",
    long_about = "Builds and packages the SmartRoom Lambda functions and runs CI checks."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every function binary, zip it as `bootstrap`, and write the deployment manifest
    Package {
        /// Compilation target triple for Lambda binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
        /// Maximum concurrent instances per function
        #[arg(long, env = MAX_INSTANCES_ENV)]
        max_instances: Option<u32>,
    },
    /// Print the deployment manifest without building anything
    Manifest {
        /// Maximum concurrent instances per function
        #[arg(long, env = MAX_INSTANCES_ENV)]
        max_instances: Option<u32>,
    },
    /// Run CI checks (fmt, clippy, tests)
    Ci,
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

// ── helpers ────────────────────────────────────────────────────────

#[derive(Debug, Error)]
enum TaskError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("`cargo {args}` exited with status {code}")]
    Cargo { args: String, code: i32 },
    #[error("rust target `{0}` is not installed; run `rustup target add {0}`")]
    MissingTarget(String),
    #[error("no function binary at '{0}'")]
    MissingBinary(PathBuf),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write bootstrap archive: {0}")]
    Zip(#[from] ZipError),
    #[error("failed to render manifest: {0}")]
    Json(#[from] serde_json::Error),
}

fn io_context(context: impl Into<String>) -> impl FnOnce(io::Error) -> TaskError {
    let context = context.into();
    move |source| TaskError::Io { context, source }
}

fn cargo(label: &str, args: &[&str]) -> Result<(), TaskError> {
    eprintln!("\n=== {label} ===\n+ cargo {}", args.join(" "));
    let status = Command::new("cargo")
        .args(args)
        .status()
        .map_err(io_context("failed to launch cargo"))?;
    if status.success() {
        Ok(())
    } else {
        Err(TaskError::Cargo {
            args: args.join(" "),
            code: status.code().unwrap_or(1),
        })
    }
}

fn resolve_config(max_instances: Option<u32>) -> Result<FunctionsConfig, TaskError> {
    let config = match max_instances {
        Some(value) => FunctionsConfig::new(value)?,
        None => FunctionsConfig::default(),
    };
    Ok(config)
}

fn binary_names() -> Vec<&'static str> {
    FunctionName::ALL
        .into_iter()
        .map(FunctionName::binary_name)
        .chain(std::iter::once(RUNTIME_BINARY))
        .collect()
}

fn artifact_name(bin_name: &str) -> String {
    format!("{bin_name}.zip")
}

fn build_manifest(config: &FunctionsConfig, generated_at: &str) -> Value {
    let functions: Vec<Value> = FunctionName::ALL
        .into_iter()
        .map(|function| {
            json!({
                "name": function.as_str(),
                "trigger": function.trigger(),
                "httpPath": function.http_path(),
                "artifact": artifact_name(function.binary_name()),
            })
        })
        .collect();

    json!({
        "generatedAt": generated_at,
        "maxInstances": config.max_instances,
        "functions": functions,
        "runtime": {
            "artifact": artifact_name(RUNTIME_BINARY),
            "serves": FunctionName::ALL.map(FunctionName::as_str),
        },
    })
}

fn render_manifest(config: &FunctionsConfig) -> Result<String, TaskError> {
    let manifest = build_manifest(config, &Utc::now().to_rfc3339());
    Ok(serde_json::to_string_pretty(&manifest)?)
}

// A missing `rustup` only skips the check; cargo reports the real failure.
fn check_target_installed(target: &str) -> Result<(), TaskError> {
    let output = match Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => {
            eprintln!("warning: could not list installed targets, building for {target} anyway");
            return Ok(());
        }
    };
    if target_listed(&String::from_utf8_lossy(&output.stdout), target) {
        Ok(())
    } else {
        Err(TaskError::MissingTarget(target.to_string()))
    }
}

fn target_listed(installed: &str, target: &str) -> bool {
    installed.lines().any(|line| line.trim() == target)
}

fn write_bootstrap_zip<W: Write + Seek>(writer: W, binary: &[u8]) -> Result<W, TaskError> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)?;
    zip.write_all(binary)
        .map_err(io_context("failed to write bootstrap entry"))?;
    Ok(zip.finish()?)
}

fn package_binary(binary_path: &Path, zip_path: &Path) -> Result<(), TaskError> {
    if !binary_path.is_file() {
        return Err(TaskError::MissingBinary(binary_path.to_path_buf()));
    }
    let binary = fs::read(binary_path)
        .map_err(io_context(format!("failed to read {}", binary_path.display())))?;
    let file = fs::File::create(zip_path)
        .map_err(io_context(format!("failed to create {}", zip_path.display())))?;
    write_bootstrap_zip(file, &binary)?;
    Ok(())
}

fn package_functions(
    target: &str,
    profile: BuildProfile,
    config: &FunctionsConfig,
) -> Result<(), TaskError> {
    check_target_installed(target)?;

    let binaries = binary_names();
    let mut cargo_args = vec!["build", "-p", LAMBDA_PACKAGE, "--target", target];
    for binary in &binaries {
        cargo_args.push("--bin");
        cargo_args.push(*binary);
    }
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    cargo("Build function binaries", &cargo_args)?;

    let target_dir = Path::new("target").join(target).join(profile.dir_name());
    let dist_dir = Path::new(DIST_DIR);
    fs::create_dir_all(dist_dir).map_err(io_context("failed to create dist directory"))?;

    eprintln!("\nPackaged artifacts:");
    for binary in &binaries {
        let zip_path = dist_dir.join(artifact_name(binary));
        package_binary(&target_dir.join(binary), &zip_path)?;
        eprintln!("- {}", zip_path.display());
    }

    let manifest_path = dist_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, render_manifest(config)?)
        .map_err(io_context("failed to write functions manifest"))?;
    eprintln!("- {}", manifest_path.display());
    Ok(())
}

// ── CI ─────────────────────────────────────────────────────────────

fn ci_check() -> Result<(), TaskError> {
    cargo("Check formatting", &["fmt", "--all", "--", "--check"])?;
    cargo(
        "Clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )?;
    cargo("Test workspace", &["test", "--workspace"])
}

// ── main ───────────────────────────────────────────────────────────

fn run(command: Commands) -> Result<(), TaskError> {
    match command {
        Commands::Package {
            target,
            profile,
            max_instances,
        } => package_functions(&target, profile, &resolve_config(max_instances)?),
        Commands::Manifest { max_instances } => {
            println!("{}", render_manifest(&resolve_config(max_instances)?)?);
            Ok(())
        }
        Commands::Ci => {
            ci_check()?;
            eprintln!("\nCI job passed.");
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli.command) {
        eprintln!("error: {error}");
        let code = match error {
            TaskError::Cargo { code, .. } => code,
            TaskError::Config(_) => 2,
            _ => 1,
        };
        exit(code);
    }
}
