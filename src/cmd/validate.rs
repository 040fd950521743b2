//! `writ validate`: validate every spec and change in the project.

use anyhow::Result;
use colored::Colorize;

use writ::delta::scan_deltas;
use writ::discovery;
use writ::report::ValidationReport;
use writ::rules::{validate_to_report, ValidateOptions};

use super::ensure_initialized;

struct ItemResult {
    id: String,
    kind: &'static str,
    report: ValidationReport,
}

/// Validate everything. Returns true only when every document is valid.
pub fn run_validate_all(strict: bool, json: bool) -> Result<bool> {
    let root = ensure_initialized()?;
    let options = ValidateOptions { strict };
    let mut results = Vec::new();

    for id in discovery::list_specs(&root)? {
        let doc = discovery::load_spec(&root, &id)?;
        results.push(ItemResult {
            id,
            kind: "spec",
            report: validate_to_report(&doc, None, &options),
        });
    }

    for id in discovery::list_changes(&root)? {
        let doc = discovery::load_change(&root, &id)?;
        let scan = scan_deltas(&doc)?;
        results.push(ItemResult {
            id,
            kind: "change",
            report: validate_to_report(&doc, Some(&scan), &options),
        });
    }

    let all_valid = results.iter().all(|r| r.report.valid);

    if json {
        let items: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "id": r.id,
                    "kind": r.kind,
                    "valid": r.report.valid,
                    "issues": r.report.issues,
                    "summary": r.report.summary,
                })
            })
            .collect();
        let value = serde_json::json!({ "valid": all_valid, "items": items });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(all_valid);
    }

    if results.is_empty() {
        println!("{}", "(nothing to validate)".dimmed());
        return Ok(true);
    }

    for result in &results {
        let icon = if result.report.valid {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "{} {} {} ({} error{}, {} warning{})",
            icon,
            result.kind.dimmed(),
            result.id.cyan(),
            result.report.summary.errors,
            if result.report.summary.errors == 1 { "" } else { "s" },
            result.report.summary.warnings,
            if result.report.summary.warnings == 1 { "" } else { "s" },
        );
        for issue in &result.report.issues {
            let label = match issue.severity {
                writ::report::Severity::Error => issue.severity.to_string().red(),
                writ::report::Severity::Warning => issue.severity.to_string().yellow(),
            };
            println!("    {} [{}] {}", label, issue.code.cyan(), issue.message);
        }
    }

    println!();
    let passed = results.iter().filter(|r| r.report.valid).count();
    let failed = results.len() - passed;
    if all_valid {
        println!(
            "{} {} item{} valid",
            "✓".green(),
            results.len(),
            if results.len() == 1 { "" } else { "s" }
        );
    } else {
        println!(
            "{} {} passed, {} {}",
            "✗".red(),
            passed,
            failed,
            "failed".red()
        );
    }

    Ok(all_valid)
}
