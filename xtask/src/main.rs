use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x")]
#[command(about = "Development automation for gvm-rs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks (fmt, clippy, build, test)
    Ci {
        #[arg(long)]
        verbose: bool,
    },
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Run clippy
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Build the project
    Build {
        #[arg(long)]
        release: bool,
        /// Leave out the viewer window (no winit/pixels)
        #[arg(long)]
        headless: bool,
    },
    /// Run tests
    Test {
        #[arg(long)]
        doc: bool,
        /// Run only program image tests
        #[arg(long)]
        image: bool,
        /// Run only screen tests
        #[arg(long)]
        screen: bool,
    },
    /// Run benchmarks
    Bench {
        /// Only benchmarks whose name contains this filter
        filter: Option<String>,
    },
    /// Validate a LAV program and print its header
    Inspect {
        /// Path to the .lav file
        lav_path: String,
    },
    /// Open a LAV program in the viewer
    Run {
        /// Path to the .lav file
        lav_path: String,
        /// Build in release mode
        #[arg(long)]
        release: bool,
    },
    /// Pre-commit checks (fmt, clippy, test)
    PreCommit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci { verbose } => run_ci(verbose),
        Commands::Fmt { check } => run_fmt(check),
        Commands::Clippy { fix } => run_clippy(fix),
        Commands::Build { release, headless } => run_build(release, headless),
        Commands::Test { doc, image, screen } => run_test(doc, image, screen),
        Commands::Bench { filter } => run_bench(filter.as_deref()),
        Commands::Inspect { lav_path } => run_inspect(&lav_path),
        Commands::Run { lav_path, release } => run_program(&lav_path, release),
        Commands::PreCommit => run_pre_commit(),
    }
}

/// Machines without a display server (CI) build without the viewer
fn headless_env() -> bool {
    std::env::var("CI").is_ok()
}

/// A `cargo <subcommand>` with the feature set for this environment
fn cargo(subcommand: &str, headless: bool) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg(subcommand);
    if headless {
        cmd.arg("--no-default-features");
    } else {
        cmd.arg("--all-features");
    }
    cmd
}

fn run_ci(verbose: bool) -> Result<()> {
    println!("{}", "=== Running CI Pipeline ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), verbose)?;
    run_task("Clippy", || run_clippy(false), verbose)?;
    run_task("Build", || run_build(false, headless_env()), verbose)?;
    run_task("Test", || run_test(false, false, false), verbose)?;
    run_task("Doc Test", || run_test(true, false, false), verbose)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_fmt(check: bool) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("fmt").arg("--all");

    if check {
        cmd.arg("--").arg("--check");
    }

    execute_command(&mut cmd)
}

fn run_clippy(fix: bool) -> Result<()> {
    let mut cmd = cargo("clippy", headless_env());
    cmd.arg("--all-targets");

    if fix {
        cmd.arg("--fix");
    } else {
        cmd.arg("--").arg("-D").arg("warnings");
    }

    execute_command(&mut cmd)
}

fn run_build(release: bool, headless: bool) -> Result<()> {
    let mut cmd = cargo("build", headless);

    if release {
        cmd.arg("--release");
    }

    execute_command(&mut cmd)
}

fn run_test(doc: bool, image: bool, screen: bool) -> Result<()> {
    let headless = headless_env();

    if doc {
        let mut cmd = cargo("test", headless);
        cmd.arg("--doc");
        return execute_command(&mut cmd);
    }

    // Unit tests live under the module path, integration tests in their own target
    let suites = [
        (image, "image", "program_image", "Program image"),
        (screen, "screen", "screen_export", "Screen"),
    ];

    if !image && !screen {
        return execute_command(&mut cargo("test", headless));
    }

    let mut failed = Vec::new();

    for (enabled, module_path, test_target, name) in suites {
        if !enabled {
            continue;
        }

        println!("{} Running {} tests...", "→".blue(), name.bold());

        let mut unit = cargo("test", headless);
        unit.arg("--lib").arg(module_path);
        let mut integration = cargo("test", headless);
        integration.arg("--test").arg(test_target);

        let result = execute_command(&mut unit).and_then(|_| execute_command(&mut integration));
        match result {
            Ok(_) => println!("{} {} tests passed\n", "✓".green(), name),
            Err(_) => {
                println!("{} {} tests failed\n", "✗".red(), name);
                failed.push(name);
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("Tests failed: {}", failed.join(", "))
    }
}

fn run_bench(filter: Option<&str>) -> Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.arg("bench");

    if let Some(filter) = filter {
        cmd.arg("--").arg(filter);
    }

    execute_command(&mut cmd)
}

/// Fail early with a readable message when a program path is wrong
fn check_program_path(lav_path: &str) -> Result<()> {
    if !Path::new(lav_path).exists() {
        println!(
            "{} Program not found: {}",
            "✗".red().bold(),
            lav_path.yellow()
        );
        anyhow::bail!("program file not found");
    }

    if !lav_path.to_lowercase().ends_with(".lav") {
        println!("{} File does not have .lav extension", "⚠".yellow().bold());
    }

    Ok(())
}

fn run_inspect(lav_path: &str) -> Result<()> {
    check_program_path(lav_path)?;

    let mut cmd = cargo("run", true);
    cmd.arg("--example").arg("image_info").arg("--").arg(lav_path);

    execute_command(&mut cmd)
}

fn run_program(lav_path: &str, release: bool) -> Result<()> {
    println!("{}", "=== LAV Viewer ===".bold().blue());

    check_program_path(lav_path)?;

    println!("{} Program: {}", "✓".green(), lav_path.cyan());
    println!(
        "{} Build mode: {}",
        "→".blue(),
        if release {
            "release".green().bold()
        } else {
            "debug".yellow().bold()
        }
    );
    println!();

    let start = Instant::now();

    let mut cmd = Command::new("cargo");
    cmd.arg("run");

    if release {
        cmd.arg("--release");
    }

    cmd.arg("--").arg(lav_path);

    if let Err(e) = execute_command(&mut cmd) {
        println!("\n{} Viewer exited with an error", "✗".red().bold());
        return Err(e);
    }

    let elapsed = start.elapsed();
    println!(
        "\n{} Viewer closed after {}",
        "✓".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_pre_commit() -> Result<()> {
    println!("{}", "=== Pre-commit Checks ===".bold().blue());

    let start = Instant::now();

    run_task("Format Check", || run_fmt(true), false)?;
    run_task("Clippy", || run_clippy(false), false)?;
    run_task("Test", || run_test(false, false, false), false)?;

    let elapsed = start.elapsed();
    println!(
        "\n{} {}",
        "✓ Pre-commit checks passed in".green().bold(),
        format!("{:.2}s", elapsed.as_secs_f64()).bold()
    );

    Ok(())
}

fn run_task<F>(name: &str, task: F, verbose: bool) -> Result<()>
where
    F: FnOnce() -> Result<()>,
{
    print!("{} {} ... ", "→".blue(), name);

    let start = Instant::now();

    match task() {
        Ok(_) => {
            let elapsed = start.elapsed();
            println!(
                "{} {}",
                "✓".green().bold(),
                if verbose {
                    format!("({:.2}s)", elapsed.as_secs_f64())
                } else {
                    String::new()
                }
            );
            Ok(())
        }
        Err(e) => {
            println!("{}", "✗".red().bold());
            Err(e)
        }
    }
}

fn execute_command(cmd: &mut Command) -> Result<()> {
    let status = cmd
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;

    if !status.success() {
        anyhow::bail!("Command failed with exit code: {}", status);
    }

    Ok(())
}
