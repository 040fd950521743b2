//! CLI entry point and command dispatch for writ.

mod cmd;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;

#[derive(Parser)]
#[command(name = "writ")]
#[command(version)]
#[command(about = "Spec and change-proposal management", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    writ init                  Create the writ/ directory layout\n    writ validate --strict      Validate every spec and change"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize writ in the current directory
    Init {
        /// Overwrite an existing writ/ directory skeleton
        #[arg(long)]
        force: bool,
    },
    /// Inspect and validate specs
    Spec {
        #[command(subcommand)]
        command: SpecCommands,
    },
    /// Inspect and validate change proposals
    Change {
        #[command(subcommand)]
        command: ChangeCommands,
    },
    /// Validate every spec and change in the project
    Validate {
        /// Treat warnings as invalidating
        #[arg(long)]
        strict: bool,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Show version and build information
    Version,
}

#[derive(Subcommand)]
enum SpecCommands {
    /// List all specs
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a parsed spec
    Show {
        /// Spec ID (directory name under writ/specs)
        id: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a spec
    Validate {
        /// Spec ID (directory name under writ/specs)
        id: Option<String>,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ChangeCommands {
    /// List all change proposals
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show a parsed change proposal with its deltas
    Show {
        /// Change ID (directory name under writ/changes)
        id: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a change proposal
    Validate {
        /// Change ID (directory name under writ/changes)
        id: Option<String>,
        #[arg(long)]
        strict: bool,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    match run() {
        Ok(valid) => {
            if !valid {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Dispatch to the command handlers. Returns the validity flag the exit
/// code is derived from; commands that do not validate anything report
/// `true`.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => cmd::init::run_init(force).map(|_| true),
        Commands::Spec { command } => match command {
            SpecCommands::List { json } => cmd::spec::run_list(json).map(|_| true),
            SpecCommands::Show { id, json } => cmd::spec::run_show(id.as_deref(), json).map(|_| true),
            SpecCommands::Validate { id, strict, json } => {
                cmd::spec::run_validate(id.as_deref(), strict, json)
            }
        },
        Commands::Change { command } => match command {
            ChangeCommands::List { json } => cmd::change::run_list(json).map(|_| true),
            ChangeCommands::Show { id, json } => {
                cmd::change::run_show(id.as_deref(), json).map(|_| true)
            }
            ChangeCommands::Validate { id, strict, json } => {
                cmd::change::run_validate(id.as_deref(), strict, json)
            }
        },
        Commands::Validate { strict, json } => cmd::validate::run_validate_all(strict, json),
        Commands::Completion { shell } => cmd_completion(shell).map(|_| true),
        Commands::Version => cmd_version().map(|_| true),
    }
}

/// Generate shell completion script
fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "writ", &mut io::stdout());
    Ok(())
}

/// Show version and build metadata baked in by build.rs
fn cmd_version() -> Result<()> {
    const GIT_SHA: &str = env!("GIT_SHA");
    const BUILD_DATE: &str = env!("BUILD_DATE");
    println!("writ {}", env!("CARGO_PKG_VERSION"));
    println!("commit: {}", GIT_SHA);
    println!("built: {}", BUILD_DATE);
    Ok(())
}
