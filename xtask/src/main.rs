//! Build automation tasks for the clockit project.
//!
//! Run with: `cargo xtask <command>`

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::{Command, ExitCode};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for the clockit project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: host tests, no_std builds, clippy, docs
    CheckAll,
    /// Build the library for a microcontroller target
    Build {
        #[arg(long, default_value = "cortex-m0")]
        target: Target,
        /// Enable defmt logging
        #[arg(long)]
        defmt: bool,
    },
    /// Run the simulated morning on the host
    Demo,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Target {
    CortexM0,
    CortexM33,
    Riscv,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.triple())
    }
}

impl Target {
    const ALL: [Self; 3] = [Self::CortexM0, Self::CortexM33, Self::Riscv];

    const fn triple(self) -> &'static str {
        match self {
            Self::CortexM0 => "thumbv6m-none-eabi",
            Self::CortexM33 => "thumbv8m.main-none-eabihf",
            Self::Riscv => "riscv32imac-unknown-none-elf",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all(),
        Commands::Build { target, defmt } => build_lib(target, defmt),
        Commands::Demo => demo(),
    }
}

fn check_all() -> ExitCode {
    let workspace_root = workspace_root();

    println!("{}", "==> Running host tests...".cyan());
    let host_target = host_target();
    match host_target.as_deref() {
        Some(target) => {
            println!(
                "  {}",
                format!("Using host target: {target}").bright_black()
            );
        }
        None => {
            println!(
                "{}",
                "  Unable to detect host target; relying on cargo default.".bright_black()
            );
        }
    }
    let mut test_cmd = Command::new("cargo");
    test_cmd
        .current_dir(&workspace_root)
        .args(["test", "--package", "clockit"]);
    if let Some(target) = &host_target {
        test_cmd.arg("--target").arg(target);
    }
    if !run_command(&mut test_cmd) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> Building library for no_std targets...".cyan());
    for target in Target::ALL {
        for defmt in [false, true] {
            let label = if defmt { "defmt" } else { "plain" };
            println!("  {}", format!("- {target} ({label})").bright_black());
            if !cargo_build(target, defmt) {
                return ExitCode::FAILURE;
            }
        }
    }

    println!("\n{}", "==> Running clippy...".cyan());
    if !run_command(Command::new("cargo").current_dir(&workspace_root).args([
        "clippy",
        "--package",
        "clockit",
        "--all-targets",
        "--",
        "-D",
        "warnings",
    ])) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> Building documentation...".cyan());
    if !run_command(Command::new("cargo").current_dir(&workspace_root).args([
        "doc",
        "--package",
        "clockit",
        "--target",
        Target::CortexM0.triple(),
        "--no-deps",
    ])) {
        return ExitCode::FAILURE;
    }

    println!("\n{}", "==> All checks passed! 🎉".green().bold());
    ExitCode::SUCCESS
}

fn build_lib(target: Target, defmt: bool) -> ExitCode {
    println!("{}", format!("Building library for {target}").cyan());
    if cargo_build(target, defmt) {
        println!("{}", "Build successful! ✨".green());
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn demo() -> ExitCode {
    if run_command(Command::new("cargo").current_dir(workspace_root()).args([
        "run",
        "--package",
        "clockit",
        "--example",
        "console_clock",
    ])) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn cargo_build(target: Target, defmt: bool) -> bool {
    let mut cmd = Command::new("cargo");
    cmd.current_dir(workspace_root()).args([
        "build",
        "--package",
        "clockit",
        "--lib",
        "--target",
        target.triple(),
    ]);
    if defmt {
        cmd.args(["--features", "defmt"]);
    }
    run_command(&mut cmd)
}

fn workspace_root() -> std::path::PathBuf {
    std::env::current_dir().expect("Failed to get current directory")
}

fn host_target() -> Option<String> {
    let output = Command::new("rustc").arg("-vV").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    for line in stdout.lines() {
        if let Some(host) = line.strip_prefix("host: ") {
            return Some(host.trim().to_string());
        }
    }
    None
}

fn run_command(cmd: &mut Command) -> bool {
    match cmd.status() {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("{}", format!("Failed to execute command: {e}").red());
            false
        }
    }
}
