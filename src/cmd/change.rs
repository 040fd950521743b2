//! `writ change`: list, show, and validate change proposals.

use anyhow::Result;
use colored::Colorize;

use writ::delta::scan_deltas;
use writ::discovery;
use writ::rules::{validate_to_report, ValidateOptions};

use super::{ensure_initialized, missing_id};

pub fn run_list(json: bool) -> Result<()> {
    let root = ensure_initialized()?;
    let ids = discovery::list_changes(&root)?;

    if json {
        let entries: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| -> Result<serde_json::Value> {
                let doc = discovery::load_change(&root, id)?;
                let scan = scan_deltas(&doc)?;
                Ok(serde_json::json!({
                    "id": id,
                    "title": doc.title,
                    "deltas": scan.deltas.len(),
                }))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if ids.is_empty() {
        println!("{}", "(no changes)".dimmed());
        return Ok(());
    }
    for id in &ids {
        let doc = discovery::load_change(&root, id)?;
        let deltas = scan_deltas(&doc)?.deltas.len();
        println!(
            "{}  {} delta{}",
            id.cyan(),
            deltas,
            if deltas == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

pub fn run_show(id: Option<&str>, json: bool) -> Result<()> {
    let root = ensure_initialized()?;
    let Some(id) = id else {
        return Err(missing_id("change", &discovery::list_changes(&root)?));
    };
    let doc = discovery::load_change(&root, id)?;
    let scan = scan_deltas(&doc)?;

    if json {
        let value = serde_json::json!({
            "id": id,
            "title": doc.title,
            "why": doc.section("Why").map(|s| s.body.as_str()),
            "deltas": scan.deltas,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", doc.title.as_deref().unwrap_or(id).bold());
    if let Some(why) = doc.section("Why") {
        println!("\n{}", "Why".bold());
        println!("{}", why.body);
    }
    println!("\n{}", "Deltas".bold());
    if scan.deltas.is_empty() {
        println!("{}", "  (none)".dimmed());
    }
    for delta in &scan.deltas {
        let mut line = format!(
            "  {} {} {}",
            delta.spec.cyan(),
            delta.operation.to_string().yellow(),
            delta.description
        );
        if let (Some(from), Some(to)) = (&delta.renamed_from, &delta.renamed_to) {
            line.push_str(&format!(" {}", format!("({} → {})", from, to).dimmed()));
        }
        println!("{}", line);
    }
    Ok(())
}

/// Validate one change proposal. Returns the validity flag for exit-code
/// wiring.
pub fn run_validate(id: Option<&str>, strict: bool, json: bool) -> Result<bool> {
    let root = ensure_initialized()?;
    let Some(id) = id else {
        return Err(missing_id("change", &discovery::list_changes(&root)?));
    };
    let doc = discovery::load_change(&root, id)?;
    let scan = scan_deltas(&doc)?;
    let report = validate_to_report(&doc, Some(&scan), &ValidateOptions { strict });

    if json {
        println!("{}", report.to_json()?);
    } else if report.valid {
        println!("{}", report.render_text(id, "change"));
    } else {
        eprintln!("{}", report.render_text(id, "change"));
    }
    Ok(report.valid)
}
