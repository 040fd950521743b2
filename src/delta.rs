//! Delta extraction from change proposals.
//!
//! A change proposal's "What Changes" section lists one bullet per spec it
//! touches, e.g. `- **auth:** Add login requirement`. Extraction classifies
//! each bullet into a [`Delta`] and degrades gracefully: a single bad bullet
//! never fails the scan, it is either skipped (no recognizable spec prefix)
//! or recorded as malformed (a rename missing its destination) for the rule
//! set to report.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::document::{DocumentKind, ParsedDocument};
use crate::markdown::{classify_lines, LineKind};

/// The heading delta bullets live under.
pub const WHAT_CHANGES_HEADING: &str = "What Changes";

/// One atomic modification a change proposal applies to a spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Renamed => write!(f, "renamed"),
        }
    }
}

/// A single parsed "What Changes" bullet. Immutable once extracted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delta {
    /// The spec the change targets.
    pub spec: String,
    pub operation: Operation,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renamed_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renamed_to: Option<String>,
}

/// A bullet that named a rename but not both endpoints. Contributes no
/// delta; the rule set flags it instead.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedBullet {
    pub spec: String,
    pub text: String,
    pub line: usize,
}

/// Everything a single pass over "What Changes" found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaScan {
    pub deltas: Vec<Delta>,
    pub malformed: Vec<MalformedBullet>,
    /// False when the document has no "What Changes" section at all.
    pub section_found: bool,
}

/// Caller-contract violations. Bad bullet content is never an error here;
/// these fire only when extraction is invoked on the wrong input shape.
#[derive(Debug, PartialEq, Eq)]
pub enum DeltaError {
    UnsupportedDocumentKind(DocumentKind),
    MissingWhatChanges,
}

impl fmt::Display for DeltaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedDocumentKind(kind) => {
                write!(f, "Cannot extract deltas from a {} document", kind)
            }
            Self::MissingWhatChanges => {
                write!(f, "Change proposal has no \"What Changes\" section")
            }
        }
    }
}

impl std::error::Error for DeltaError {}

/// Scan a change proposal for deltas, tolerating bad bullets.
///
/// Fails only when `doc` is not a change proposal. Used by validation
/// (which wants malformed bullets too) and by `change show`.
pub fn scan_deltas(doc: &ParsedDocument) -> Result<DeltaScan, DeltaError> {
    if doc.kind != DocumentKind::ChangeProposal {
        return Err(DeltaError::UnsupportedDocumentKind(doc.kind));
    }

    let Some(section) = doc.section(WHAT_CHANGES_HEADING) else {
        return Ok(DeltaScan::default());
    };

    let mut scan = DeltaScan {
        section_found: true,
        ..DeltaScan::default()
    };

    // Re-classify against the full source so bullet line numbers stay
    // document-accurate.
    for line in classify_lines(&doc.source) {
        if line.number <= section.start_line || line.number > section.end_line {
            continue;
        }
        let LineKind::ListItem { indent: 0, text } = &line.kind else {
            continue;
        };
        match classify_bullet(text) {
            Bullet::Delta(delta) => scan.deltas.push(delta),
            Bullet::MalformedRename { spec } => scan.malformed.push(MalformedBullet {
                spec,
                text: text.clone(),
                line: line.number,
            }),
            Bullet::Unrecognized => {}
        }
    }

    Ok(scan)
}

/// Extract the delta list from a change proposal.
///
/// This is the strict entry point: it also fails when the "What Changes"
/// section is structurally absent. Validation uses [`scan_deltas`] instead
/// so the missing section becomes an issue rather than an error.
pub fn extract_deltas(doc: &ParsedDocument) -> Result<Vec<Delta>, DeltaError> {
    let scan = scan_deltas(doc)?;
    if !scan.section_found {
        return Err(DeltaError::MissingWhatChanges);
    }
    Ok(scan.deltas)
}

enum Bullet {
    Delta(Delta),
    MalformedRename { spec: String },
    Unrecognized,
}

fn classify_bullet(text: &str) -> Bullet {
    let Some((spec, description)) = split_spec_prefix(text) else {
        return Bullet::Unrecognized;
    };

    let operation = classify_operation(&description);
    if operation != Operation::Renamed {
        return Bullet::Delta(Delta {
            spec,
            operation,
            description,
            renamed_from: None,
            renamed_to: None,
        });
    }

    // A rename must name its destination; the source defaults to the
    // bullet's own spec id.
    let Some(to) = rename_endpoint(&description, "to") else {
        return Bullet::MalformedRename { spec };
    };
    let from = rename_endpoint(&description, "from").unwrap_or_else(|| spec.clone());

    Bullet::Delta(Delta {
        spec,
        operation,
        description,
        renamed_from: Some(from),
        renamed_to: Some(to),
    })
}

/// Split `**auth:** Add requirement` or `auth: Add requirement` into the
/// spec id and the free-text description.
fn split_spec_prefix(text: &str) -> Option<(String, String)> {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    static PLAIN: OnceLock<Regex> = OnceLock::new();

    let bold = BOLD.get_or_init(|| {
        Regex::new(r"^\*\*([A-Za-z0-9][A-Za-z0-9._/ -]*?):?\*\*:?\s*(.*)$").unwrap()
    });
    let plain = PLAIN
        .get_or_init(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._/-]*):\s*(.*)$").unwrap());

    for re in [bold, plain] {
        if let Some(caps) = re.captures(text) {
            let spec = caps[1].trim().to_string();
            let description = caps[2].trim().to_string();
            return Some((spec, description));
        }
    }
    None
}

/// Classify the operation from the leading keyword of the description.
/// Unlabeled bullets default to MODIFIED, matching the authoring
/// convention.
fn classify_operation(description: &str) -> Operation {
    let head: String = description
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .take_while(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    match head.as_str() {
        "add" | "adds" | "added" | "new" | "create" | "created" => Operation::Added,
        "remove" | "removes" | "removed" | "delete" | "deleted" | "drop" | "dropped" => {
            Operation::Removed
        }
        "rename" | "renames" | "renamed" => Operation::Renamed,
        _ => Operation::Modified,
    }
}

/// Pull the identifier after `to`/`from` in a rename description, shedding
/// backticks and bold markers.
fn rename_endpoint(description: &str, keyword: &str) -> Option<String> {
    static TO: OnceLock<Regex> = OnceLock::new();
    static FROM: OnceLock<Regex> = OnceLock::new();

    let re = match keyword {
        "to" => TO.get_or_init(|| {
            Regex::new(r"(?i)\bto\s+[`*]*([A-Za-z0-9][A-Za-z0-9._/-]*)").unwrap()
        }),
        _ => FROM.get_or_init(|| {
            Regex::new(r"(?i)\bfrom\s+[`*]*([A-Za-z0-9][A-Za-z0-9._/-]*)").unwrap()
        }),
    };

    re.captures(description).map(|caps| caps[1].to_string())
}
