//! Command module structure for the writ CLI.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use writ::discovery;

pub mod change;
pub mod init;
pub mod spec;
pub mod validate;

/// Locate the project root (the directory containing `writ/`), walking up
/// from the current directory. Errors when writ has not been initialized.
pub fn ensure_initialized() -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    discovery::find_project_root(&cwd)
        .ok_or_else(|| anyhow::anyhow!("Writ not initialized. Run `writ init` first."))
}

/// Report a missing ID argument, listing what is available, and signal
/// failure. Shared by the spec and change subcommands.
pub fn missing_id(noun: &str, available: &[String]) -> anyhow::Error {
    eprintln!("{} No {} specified.", "✗".red(), noun);
    if available.is_empty() {
        eprintln!("  (none found)");
    } else {
        eprintln!("  Available IDs:");
        for id in available {
            eprintln!("    {}", id.cyan());
        }
    }
    anyhow::anyhow!("Missing required argument <{}-id>", noun)
}
