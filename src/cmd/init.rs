//! `writ init`: create the project directory skeleton.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use writ::paths::{CHANGES_DIR, SPECS_DIR};

const README: &str = "\
# writ

This directory holds the project's specs and change proposals.

- `specs/<spec-id>/spec.md` — one spec per capability, with `## Purpose`
  and `## Requirements` sections. Requirements are `### Requirement: <name>`
  headings; scenarios are `#### Scenario: <description>` blocks.
- `changes/<change-id>/proposal.md` — one proposal per change, with `## Why`
  and `## What Changes` sections. Each What Changes bullet names the spec it
  touches, e.g. `- **auth:** Add a session-expiry requirement`.

Run `writ validate --strict` to check everything.
";

pub fn run_init(force: bool) -> Result<()> {
    let root = Path::new("writ");

    if root.exists() && !force {
        println!(
            "{} writ/ already exists (use --force to recreate the skeleton)",
            "ℹ".cyan()
        );
        return Ok(());
    }

    for dir in [SPECS_DIR, CHANGES_DIR] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir))?;
    }
    fs::write(root.join("README.md"), README).context("Failed to write writ/README.md")?;

    println!("{} Initialized writ in ./writ", "✓".green());
    println!("  {} writ/specs", "•".cyan());
    println!("  {} writ/changes", "•".cyan());
    Ok(())
}
