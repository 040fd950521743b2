//! Validation report aggregation and rendering.
//!
//! [`ValidationReport::build`] is pure aggregation over an issue list; the
//! two renderers serialize it for machines (`--json`, additive-only field
//! evolution) or humans (severity-prefixed lines plus a single "Next
//! steps:" footer when invalid).

use colored::Colorize;
use serde::Serialize;

/// Severity of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Where in the document an issue points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
}

/// A single validation finding with a stable code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Issue {
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn in_section(self, section: &crate::document::Section) -> Self {
        self.at(Location {
            section: Some(section.heading.clone()),
            start_line: Some(section.start_line),
            end_line: Some(section.end_line),
            ..Location::default()
        })
    }

    pub fn in_requirement(self, requirement: &crate::document::Requirement) -> Self {
        self.at(Location {
            requirement: Some(requirement.name.clone()),
            start_line: Some(requirement.start_line),
            end_line: Some(requirement.end_line),
            ..Location::default()
        })
    }
}

/// Issue counts by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

/// The result of one validation pass. Built fresh per call and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

impl ValidationReport {
    /// Aggregate issues into a report. Under strict mode any issue at all
    /// invalidates the subject; otherwise only errors do.
    pub fn build(issues: Vec<Issue>, strict: bool) -> Self {
        let summary = Summary {
            errors: issues
                .iter()
                .filter(|i| i.severity == Severity::Error)
                .count(),
            warnings: issues
                .iter()
                .filter(|i| i.severity == Severity::Warning)
                .count(),
        };

        let valid = if strict {
            issues.is_empty()
        } else {
            summary.errors == 0
        };

        Self {
            valid,
            issues,
            summary,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render the report for a terminal: one-line verdict, one line per
    /// issue, and (only when invalid) a trailing "Next steps:" block with
    /// concrete follow-up commands. The footer appears exactly once, after
    /// every issue line. `noun` is the subcommand family the subject
    /// belongs to: "spec" or "change".
    pub fn render_text(&self, subject_id: &str, noun: &str) -> String {
        let mut out = Vec::new();

        if self.valid {
            out.push(format!("{} {} is valid", "✓".green(), subject_id.cyan()));
        } else {
            out.push(format!("{} {} has issues", "✗".red(), subject_id.cyan()));
        }

        for issue in &self.issues {
            out.push(render_issue(issue));
        }

        if !self.valid {
            out.push(String::new());
            out.push("Next steps:".bold().to_string());
            out.push(format!(
                "  {} Run `writ {} show {} --json` to inspect the parsed document",
                "→".cyan(),
                noun,
                subject_id
            ));
            out.push(format!(
                "  {} Edit the document, then re-run `writ {} validate {}`",
                "→".cyan(),
                noun,
                subject_id
            ));
        }

        out.join("\n")
    }
}

fn render_issue(issue: &Issue) -> String {
    let (icon, label) = match issue.severity {
        Severity::Error => ("✗".red(), issue.severity.to_string().red()),
        Severity::Warning => ("⚠".yellow(), issue.severity.to_string().yellow()),
    };

    let mut line = format!("  {} {} [{}] {}", icon, label, issue.code.cyan(), issue.message);

    if let Some(location) = &issue.location {
        if let Some(start) = location.start_line {
            let span = match location.end_line {
                Some(end) if end != start => format!("lines {}-{}", start, end),
                _ => format!("line {}", start),
            };
            line.push_str(&format!(" {}", format!("({})", span).dimmed()));
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_issues() -> Vec<Issue> {
        vec![
            Issue::warning("why-too-short", "The Why section is too short"),
            Issue::error("delta-missing", "No deltas found"),
        ]
    }

    #[test]
    fn test_valid_when_no_errors() {
        let report = ValidationReport::build(
            vec![Issue::warning("why-too-short", "short")],
            false,
        );
        assert!(report.valid);
        assert_eq!(report.summary.warnings, 1);
        assert_eq!(report.summary.errors, 0);
    }

    #[test]
    fn test_strict_mode_counts_warnings_against_validity() {
        let report = ValidationReport::build(
            vec![Issue::warning("why-too-short", "short")],
            true,
        );
        assert!(!report.valid);
    }

    #[test]
    fn test_build_is_idempotent_in_json() {
        let a = ValidationReport::build(sample_issues(), false);
        let b = ValidationReport::build(sample_issues(), false);
        assert_eq!(a.to_json().unwrap(), b.to_json().unwrap());
    }

    #[test]
    fn test_json_shape_is_stable() {
        let report = ValidationReport::build(sample_issues(), false);
        let value: serde_json::Value =
            serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(value["valid"], false);
        assert_eq!(value["issues"][0]["severity"], "warning");
        assert_eq!(value["issues"][1]["code"], "delta-missing");
        assert_eq!(value["summary"]["errors"], 1);
    }

    #[test]
    fn test_footer_only_when_invalid_and_after_issues() {
        colored::control::set_override(false);
        let invalid = ValidationReport::build(sample_issues(), false);
        let text = invalid.render_text("add-2fa", "change");
        assert!(text.contains("add-2fa has issues"));
        assert_eq!(text.matches("Next steps:").count(), 1);
        let footer_at = text.find("Next steps:").unwrap();
        let last_issue_at = text.find("delta-missing").unwrap();
        assert!(footer_at > last_issue_at);
        assert!(text.contains("writ change show add-2fa"));

        let valid = ValidationReport::build(Vec::new(), false);
        let text = valid.render_text("add-2fa", "change");
        assert!(text.contains("add-2fa is valid"));
        assert!(!text.contains("Next steps:"));
        colored::control::unset_override();
    }

    #[test]
    fn test_issue_line_includes_location_span() {
        colored::control::set_override(false);
        let issue = Issue::error("requirement-empty", "Requirement has no body").at(Location {
            requirement: Some("Login".to_string()),
            start_line: Some(7),
            end_line: Some(9),
            ..Location::default()
        });
        let text = ValidationReport::build(vec![issue], false).render_text("auth", "spec");
        assert!(text.contains("(lines 7-9)"));
        colored::control::unset_override();
    }
}
