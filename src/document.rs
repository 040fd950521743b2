//! Document model and tree building for specs and change proposals.
//!
//! [`parse`] is a total function: malformed input never fails, it just
//! produces a thinner tree and the rule set in [`crate::rules`] reports
//! what is missing. Line numbers are retained throughout so issues can
//! point back into the source.

use serde::Serialize;

use crate::markdown::{classify_lines, Line, LineKind};

/// What a document claims to be. Parsing is shared; validation and delta
/// extraction branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Spec,
    ChangeProposal,
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spec => write!(f, "spec"),
            Self::ChangeProposal => write!(f, "change-proposal"),
        }
    }
}

/// A parsed spec or change proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedDocument {
    pub kind: DocumentKind,
    /// Text of the first `# ` heading, if any.
    pub title: Option<String>,
    /// Depth-2 sections in source order. Line ranges never overlap.
    pub sections: Vec<Section>,
    /// The original text, kept for line-accurate reporting.
    #[serde(skip_serializing)]
    pub source: String,
}

/// A depth-2 section (`## Purpose`, `## What Changes`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub heading: String,
    pub level: usize,
    /// Raw body text between this heading and the next one at depth <= 2.
    pub body: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Parsed only for "Requirements" sections; empty elsewhere.
    pub requirements: Vec<Requirement>,
}

/// A `### Requirement: <name>` block inside a Requirements section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub name: String,
    /// Prose between the requirement heading and its first scenario.
    pub body: String,
    pub scenarios: Vec<Scenario>,
    pub start_line: usize,
    pub end_line: usize,
}

/// A scenario block. The Given/When/Then lines are kept verbatim; writ
/// groups them but does not interpret them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub description: String,
    pub lines: Vec<String>,
    pub start_line: usize,
}

impl ParsedDocument {
    /// Look up a section by heading, case-insensitively.
    pub fn section(&self, heading: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|s| s.heading.eq_ignore_ascii_case(heading))
    }

    /// All requirements across every Requirements section, in source order.
    pub fn requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.sections.iter().flat_map(|s| s.requirements.iter())
    }
}

/// Parse raw markdown into a [`ParsedDocument`]. Never fails; structural
/// gaps surface later as validation issues.
pub fn parse(text: &str, kind: DocumentKind) -> ParsedDocument {
    let lines = classify_lines(text);

    let mut title = None;
    let mut sections = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        match &lines[i].kind {
            LineKind::Heading { depth: 1, text } if title.is_none() => {
                title = Some(text.clone());
                i += 1;
            }
            LineKind::Heading { depth: 2, text } => {
                let mut j = i + 1;
                while j < lines.len() && !is_heading_at_or_above(&lines[j], 2) {
                    j += 1;
                }
                sections.push(build_section(text, &lines[i], &lines[i + 1..j]));
                i = j;
            }
            _ => i += 1,
        }
    }

    ParsedDocument {
        kind,
        title,
        sections,
        source: text.to_string(),
    }
}

fn is_heading_at_or_above(line: &Line, max_depth: usize) -> bool {
    matches!(&line.kind, LineKind::Heading { depth, .. } if *depth <= max_depth)
}

fn build_section(heading: &str, heading_line: &Line, body: &[Line]) -> Section {
    let end_line = body.last().map(|l| l.number).unwrap_or(heading_line.number);

    let requirements = if heading.eq_ignore_ascii_case("Requirements") {
        parse_requirements(body)
    } else {
        Vec::new()
    };

    Section {
        heading: heading.to_string(),
        level: 2,
        body: join_raw(body),
        start_line: heading_line.number,
        end_line,
        requirements,
    }
}

fn parse_requirements(body: &[Line]) -> Vec<Requirement> {
    let mut requirements = Vec::new();
    let mut i = 0;

    while i < body.len() {
        let name = match &body[i].kind {
            LineKind::Heading { depth: 3, text } => text.strip_prefix("Requirement:"),
            _ => None,
        };

        let Some(name) = name else {
            i += 1;
            continue;
        };

        // A requirement closes on the next heading at depth <= 3 or end of
        // the section; blank lines never close it.
        let mut j = i + 1;
        while j < body.len() && !is_heading_at_or_above(&body[j], 3) {
            j += 1;
        }

        requirements.push(build_requirement(name.trim(), &body[i], &body[i + 1..j]));
        i = j;
    }

    requirements
}

fn build_requirement(name: &str, heading_line: &Line, block: &[Line]) -> Requirement {
    let end_line = block.last().map(|l| l.number).unwrap_or(heading_line.number);

    // Body is everything up to the first scenario marker.
    let body_end = block
        .iter()
        .position(|l| scenario_marker(l).is_some())
        .unwrap_or(block.len());

    let mut scenarios = Vec::new();
    let mut i = body_end;
    while i < block.len() {
        let Some(description) = scenario_marker(&block[i]) else {
            i += 1;
            continue;
        };

        let mut j = i + 1;
        while j < block.len() && scenario_marker(&block[j]).is_none() {
            j += 1;
        }

        let lines: Vec<String> = block[i + 1..j]
            .iter()
            .map(|l| l.raw.clone())
            .collect();

        scenarios.push(Scenario {
            description,
            lines: trim_trailing_blanks(lines),
            start_line: block[i].number,
        });
        i = j;
    }

    Requirement {
        name: name.to_string(),
        body: join_raw(&block[..body_end]),
        scenarios,
        start_line: heading_line.number,
        end_line,
    }
}

/// Return the scenario description if this line opens a scenario.
///
/// Two marker forms are recognized: a depth-4 heading (`#### Scenario: X`)
/// and a bolded marker (`**Scenario: X**`), bare or as a list item.
fn scenario_marker(line: &Line) -> Option<String> {
    let content = match &line.kind {
        LineKind::Heading { depth: 4, text } => text.as_str(),
        LineKind::ListItem { text, .. } => text.as_str(),
        LineKind::Text => line.raw.trim(),
        _ => return None,
    };

    if let Some(rest) = content.strip_prefix("Scenario:") {
        if matches!(line.kind, LineKind::Heading { .. }) {
            return Some(rest.trim().to_string());
        }
        return None;
    }

    let bold = content.strip_prefix("**Scenario:")?;
    let description = bold.strip_suffix("**").unwrap_or(bold);
    Some(description.trim().to_string())
}

fn join_raw(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|l| l.raw.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn trim_trailing_blanks(mut lines: Vec<String>) -> Vec<String> {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}
