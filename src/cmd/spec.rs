//! `writ spec`: list, show, and validate specs.

use anyhow::Result;
use colored::Colorize;

use writ::discovery;
use writ::rules::{validate_to_report, ValidateOptions};

use super::{ensure_initialized, missing_id};

pub fn run_list(json: bool) -> Result<()> {
    let root = ensure_initialized()?;
    let ids = discovery::list_specs(&root)?;

    if json {
        let entries: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| -> Result<serde_json::Value> {
                let doc = discovery::load_spec(&root, id)?;
                Ok(serde_json::json!({
                    "id": id,
                    "title": doc.title,
                    "requirements": doc.requirements().count(),
                }))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if ids.is_empty() {
        println!("{}", "(no specs)".dimmed());
        return Ok(());
    }
    for id in &ids {
        let doc = discovery::load_spec(&root, id)?;
        let requirements = doc.requirements().count();
        println!(
            "{}  {} requirement{}",
            id.cyan(),
            requirements,
            if requirements == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

pub fn run_show(id: Option<&str>, json: bool) -> Result<()> {
    let root = ensure_initialized()?;
    let Some(id) = id else {
        return Err(missing_id("spec", &discovery::list_specs(&root)?));
    };
    let doc = discovery::load_spec(&root, id)?;

    if json {
        let requirements: Vec<serde_json::Value> = doc
            .requirements()
            .map(|r| {
                serde_json::json!({
                    "name": r.name,
                    "scenarios": r.scenarios.iter().map(|s| s.description.as_str()).collect::<Vec<_>>(),
                })
            })
            .collect();
        let value = serde_json::json!({
            "id": id,
            "title": doc.title,
            "sections": doc.sections.iter().map(|s| s.heading.as_str()).collect::<Vec<_>>(),
            "requirements": requirements,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!(
        "{}",
        doc.title.as_deref().unwrap_or(id).bold()
    );
    for section in &doc.sections {
        println!("  {} {}", "##".dimmed(), section.heading);
        for requirement in &section.requirements {
            println!("    {} {}", "•".cyan(), requirement.name);
            for scenario in &requirement.scenarios {
                println!("      {} Scenario: {}", "-".dimmed(), scenario.description);
            }
        }
    }
    Ok(())
}

/// Validate one spec. Returns the validity flag for exit-code wiring.
pub fn run_validate(id: Option<&str>, strict: bool, json: bool) -> Result<bool> {
    let root = ensure_initialized()?;
    let Some(id) = id else {
        return Err(missing_id("spec", &discovery::list_specs(&root)?));
    };
    let doc = discovery::load_spec(&root, id)?;
    let report = validate_to_report(&doc, None, &ValidateOptions { strict });

    if json {
        println!("{}", report.to_json()?);
    } else if report.valid {
        println!("{}", report.render_text(id, "spec"));
    } else {
        eprintln!("{}", report.render_text(id, "spec"));
    }
    Ok(report.valid)
}
