use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for retrace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: fmt, clippy, tests, doc
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Build rustdoc for the workspace
    Doc,
    /// Run the timeline replay benchmark
    Bench,
    /// Run every CLI demo in each storage mode
    Demo,
}

const CHECK_STEPS: [(&str, &[&str]); 4] = [
    ("fmt", &["fmt", "--all", "--", "--check"]),
    (
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    ),
    ("test", &["test", "--workspace"]),
    ("doc", &["doc", "--workspace", "--no-deps"]),
];

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            for (name, args) in CHECK_STEPS {
                cargo(name, args)?;
            }
        }
        Commands::Fmt => cargo("fmt", CHECK_STEPS[0].1)?,
        Commands::Clippy => cargo("clippy", CHECK_STEPS[1].1)?,
        Commands::Test => cargo("test", CHECK_STEPS[2].1)?,
        Commands::Doc => cargo("doc", CHECK_STEPS[3].1)?,
        Commands::Bench => cargo(
            "bench",
            &["bench", "-p", "retrace-timeline", "--bench", "bench_replay"],
        )?,
        Commands::Demo => run_demos()?,
    }

    Ok(())
}

fn run_demos() -> Result<()> {
    for mode in ["full", "patch", "hybrid"] {
        for demo in ["scenario", "branches", "replay"] {
            cargo(
                demo,
                &["run", "-q", "-p", "retrace-cli", "--", "--mode", mode, demo],
            )?;
        }
    }
    Ok(())
}

/// Run `cargo <args>`, failing if it exits unsuccessfully.
fn cargo(name: &str, args: &[&str]) -> Result<()> {
    println!("==> Running cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {name} failed");
    }
    Ok(())
}
