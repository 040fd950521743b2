//! The validation rule engine.
//!
//! Rules are independent, side-effect-free values behind the [`Rule`]
//! trait, collected once into an ordered registry. [`validate`] runs every
//! rule and concatenates the findings, so the issue order is always rule
//! registration order, then document order within a rule. A rule that
//! panics is isolated: the engine converts it into a single synthetic
//! `rule-failed` error and keeps going.

use std::collections::HashSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use crate::delta::{scan_deltas, DeltaScan};
use crate::document::{DocumentKind, ParsedDocument};
use crate::report::{Issue, Location, Severity, ValidationReport};

/// Minimum prose length for a change proposal's "Why" section. A one-line
/// justification is not enough to review a change against.
pub const MIN_WHY_LENGTH: usize = 50;

/// Options for a validation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Strict mode never adds rules; it escalates the warning codes that
    /// opt in and makes any issue at all invalidate the subject.
    pub strict: bool,
}

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub doc: &'a ParsedDocument,
    pub deltas: Option<&'a DeltaScan>,
    pub strict: bool,
}

/// A single validation rule.
pub trait Rule: Send + Sync {
    /// Stable rule name, used in `rule-failed` diagnostics.
    fn name(&self) -> &'static str;
    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue>;
}

/// Warning severity that escalates to error under strict mode.
fn escalating(strict: bool) -> Severity {
    if strict {
        Severity::Error
    } else {
        Severity::Warning
    }
}

fn with_severity(severity: Severity, code: &str, message: String) -> Issue {
    match severity {
        Severity::Error => Issue::error(code, message),
        Severity::Warning => Issue::warning(code, message),
    }
}

/// Run every registered rule over `doc`.
///
/// `deltas` is the scan produced alongside a change proposal; passing
/// `None` for a change proposal makes the engine scan on the fly, so the
/// contract stays usable from either direction.
pub fn validate(
    doc: &ParsedDocument,
    deltas: Option<&DeltaScan>,
    options: &ValidateOptions,
) -> Vec<Issue> {
    let owned;
    let deltas = match deltas {
        Some(scan) => Some(scan),
        None if doc.kind == DocumentKind::ChangeProposal => {
            owned = scan_deltas(doc).ok();
            owned.as_ref()
        }
        None => None,
    };

    let ctx = RuleContext {
        doc,
        deltas,
        strict: options.strict,
    };

    run_rules(registry(), &ctx)
}

/// Run `rules` in order over `ctx`. A panicking rule is converted into a
/// single `rule-failed` error; the remaining rules still run.
fn run_rules(rules: &[Box<dyn Rule>], ctx: &RuleContext) -> Vec<Issue> {
    let mut issues = Vec::new();
    for rule in rules {
        match catch_unwind(AssertUnwindSafe(|| rule.evaluate(ctx))) {
            Ok(found) => issues.extend(found),
            Err(_) => issues.push(Issue::error(
                "rule-failed",
                format!(
                    "Validation rule '{}' failed internally; remaining rules still ran",
                    rule.name()
                ),
            )),
        }
    }
    issues
}

/// Validate and aggregate in one step.
pub fn validate_to_report(
    doc: &ParsedDocument,
    deltas: Option<&DeltaScan>,
    options: &ValidateOptions,
) -> ValidationReport {
    ValidationReport::build(validate(doc, deltas, options), options.strict)
}

/// The rule registry, built once and read-only afterwards. Order here is
/// the order issues are emitted in.
fn registry() -> &'static [Box<dyn Rule>] {
    static REGISTRY: OnceLock<Vec<Box<dyn Rule>>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        vec![
            Box::new(PurposePresent),
            Box::new(RequirementsPresent),
            Box::new(RequirementBodies),
            Box::new(RequirementScenarios),
            Box::new(DuplicateRequirements),
            Box::new(WhyPresent),
            Box::new(WhatChangesPresent),
            Box::new(WhySufficient),
            Box::new(DeltasPresent),
            Box::new(RenamesComplete),
        ]
    })
}

// ============================================================================
// SPEC RULES
// ============================================================================

struct PurposePresent;

impl Rule for PurposePresent {
    fn name(&self) -> &'static str {
        "purpose-present"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::Spec || ctx.doc.section("Purpose").is_some() {
            return Vec::new();
        }
        vec![Issue::error(
            "purpose-missing",
            "Spec is missing a \"Purpose\" section",
        )]
    }
}

struct RequirementsPresent;

impl Rule for RequirementsPresent {
    fn name(&self) -> &'static str {
        "requirements-present"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::Spec || ctx.doc.section("Requirements").is_some() {
            return Vec::new();
        }
        vec![Issue::error(
            "requirements-missing",
            "Spec is missing a \"Requirements\" section",
        )]
    }
}

struct RequirementBodies;

impl Rule for RequirementBodies {
    fn name(&self) -> &'static str {
        "requirement-bodies"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::Spec {
            return Vec::new();
        }
        ctx.doc
            .requirements()
            .filter(|r| r.body.trim().is_empty())
            .map(|r| {
                Issue::error(
                    "requirement-empty",
                    format!("Requirement \"{}\" has an empty body", r.name),
                )
                .in_requirement(r)
            })
            .collect()
    }
}

struct RequirementScenarios;

impl Rule for RequirementScenarios {
    fn name(&self) -> &'static str {
        "requirement-scenarios"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::Spec {
            return Vec::new();
        }
        let severity = escalating(ctx.strict);
        ctx.doc
            .requirements()
            .filter(|r| r.scenarios.is_empty())
            .map(|r| {
                with_severity(
                    severity,
                    "requirement-no-scenario",
                    format!("Requirement \"{}\" has no scenarios", r.name),
                )
                .in_requirement(r)
            })
            .collect()
    }
}

struct DuplicateRequirements;

impl Rule for DuplicateRequirements {
    fn name(&self) -> &'static str {
        "duplicate-requirements"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::Spec {
            return Vec::new();
        }
        let severity = escalating(ctx.strict);
        let mut seen = HashSet::new();
        let mut issues = Vec::new();
        for requirement in ctx.doc.requirements() {
            if !seen.insert(requirement.name.as_str()) {
                issues.push(
                    with_severity(
                        severity,
                        "requirement-duplicate",
                        format!(
                            "Requirement \"{}\" is defined more than once",
                            requirement.name
                        ),
                    )
                    .in_requirement(requirement),
                );
            }
        }
        issues
    }
}

// ============================================================================
// CHANGE PROPOSAL RULES
// ============================================================================

struct WhyPresent;

impl Rule for WhyPresent {
    fn name(&self) -> &'static str {
        "why-present"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::ChangeProposal || ctx.doc.section("Why").is_some() {
            return Vec::new();
        }
        vec![Issue::error(
            "why-missing",
            "Change proposal is missing a \"Why\" section",
        )]
    }
}

struct WhatChangesPresent;

impl Rule for WhatChangesPresent {
    fn name(&self) -> &'static str {
        "what-changes-present"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::ChangeProposal
            || ctx.doc.section("What Changes").is_some()
        {
            return Vec::new();
        }
        vec![Issue::error(
            "what-changes-missing",
            "Change proposal is missing a \"What Changes\" section",
        )]
    }
}

struct WhySufficient;

impl Rule for WhySufficient {
    fn name(&self) -> &'static str {
        "why-sufficient"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::ChangeProposal {
            return Vec::new();
        }
        let Some(section) = ctx.doc.section("Why") else {
            return Vec::new();
        };
        if section.body.trim().len() >= MIN_WHY_LENGTH {
            return Vec::new();
        }
        vec![with_severity(
            escalating(ctx.strict),
            "why-too-short",
            format!(
                "The \"Why\" section should explain the motivation (at least {} characters)",
                MIN_WHY_LENGTH
            ),
        )
        .in_section(section)]
    }
}

struct DeltasPresent;

impl Rule for DeltasPresent {
    fn name(&self) -> &'static str {
        "deltas-present"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::ChangeProposal {
            return Vec::new();
        }
        let Some(scan) = ctx.deltas else {
            return Vec::new();
        };
        // When the whole section is absent the structural rule already
        // reported it; when bullets are malformed the rename rule does.
        if !scan.section_found || !scan.deltas.is_empty() || !scan.malformed.is_empty() {
            return Vec::new();
        }
        let mut issue = Issue::error(
            "delta-missing",
            "Change proposal has no deltas; a change must modify at least one spec",
        );
        if let Some(section) = ctx.doc.section("What Changes") {
            issue = issue.in_section(section);
        }
        vec![issue]
    }
}

struct RenamesComplete;

impl Rule for RenamesComplete {
    fn name(&self) -> &'static str {
        "renames-complete"
    }

    fn evaluate(&self, ctx: &RuleContext) -> Vec<Issue> {
        if ctx.doc.kind != DocumentKind::ChangeProposal {
            return Vec::new();
        }
        let Some(scan) = ctx.deltas else {
            return Vec::new();
        };
        scan.malformed
            .iter()
            .map(|bullet| {
                Issue::error(
                    "delta-rename-incomplete",
                    format!(
                        "Rename bullet for \"{}\" must name both the source and the destination spec",
                        bullet.spec
                    ),
                )
                .at(Location {
                    section: Some("What Changes".to_string()),
                    start_line: Some(bullet.line),
                    end_line: Some(bullet.line),
                    ..Location::default()
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parse;

    fn spec(text: &str) -> ParsedDocument {
        parse(text, DocumentKind::Spec)
    }

    fn change(text: &str) -> ParsedDocument {
        parse(text, DocumentKind::ChangeProposal)
    }

    fn codes(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    const VALID_SPEC: &str = "\
## Purpose
Authenticate users.

## Requirements

### Requirement: Login
Users MUST be able to log in.

#### Scenario: Valid credentials
- WHEN correct credentials are submitted
- THEN a session is created
";

    #[test]
    fn test_valid_spec_has_zero_issues() {
        let issues = validate(&spec(VALID_SPEC), None, &ValidateOptions::default());
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
        let report = validate_to_report(&spec(VALID_SPEC), None, &ValidateOptions::default());
        assert!(report.valid);
    }

    #[test]
    fn test_spec_missing_sections() {
        let issues = validate(&spec("just prose\n"), None, &ValidateOptions::default());
        assert_eq!(codes(&issues), vec!["purpose-missing", "requirements-missing"]);
    }

    #[test]
    fn test_requirement_without_scenario_warns_then_escalates() {
        let text = "\
## Purpose
Something long enough.

## Requirements

### Requirement: Bare
Has a body but no scenario.
";
        let relaxed = validate(&spec(text), None, &ValidateOptions { strict: false });
        assert_eq!(codes(&relaxed), vec!["requirement-no-scenario"]);
        assert_eq!(relaxed[0].severity, Severity::Warning);

        let strict = validate(&spec(text), None, &ValidateOptions { strict: true });
        assert_eq!(strict[0].severity, Severity::Error);
    }

    #[test]
    fn test_empty_requirement_body_is_error() {
        let text = "\
## Purpose
P.

## Requirements

### Requirement: Hollow

#### Scenario: still here
- THEN nothing
";
        let issues = validate(&spec(text), None, &ValidateOptions::default());
        assert_eq!(codes(&issues), vec!["requirement-empty"]);
        assert_eq!(issues[0].severity, Severity::Error);
        let location = issues[0].location.as_ref().unwrap();
        assert_eq!(location.requirement.as_deref(), Some("Hollow"));
    }

    #[test]
    fn test_duplicate_requirement_flagged_once_per_extra() {
        let text = "\
## Purpose
P.

## Requirements

### Requirement: Same
A.

#### Scenario: a
- THEN a

### Requirement: Same
B.

#### Scenario: b
- THEN b
";
        let issues = validate(&spec(text), None, &ValidateOptions::default());
        assert_eq!(codes(&issues), vec!["requirement-duplicate"]);
    }

    #[test]
    fn test_why_too_short_flips_valid_under_strict() {
        let text = "\
## Why
too short

## What Changes
- **auth:** Add requirement
";
        let relaxed = validate_to_report(&change(text), None, &ValidateOptions { strict: false });
        assert_eq!(codes(&relaxed.issues), vec!["why-too-short"]);
        assert!(relaxed.valid);

        let strict = validate_to_report(&change(text), None, &ValidateOptions { strict: true });
        assert!(!strict.valid);
    }

    #[test]
    fn test_prose_only_what_changes_is_exactly_one_error() {
        let text = "\
## Why
This is a sufficiently long explanation of the motivation for this change.

## What Changes
There are changes proposed, but no delta specs provided yet.
";
        let report = validate_to_report(&change(text), None, &ValidateOptions::default());
        assert!(!report.valid);
        assert_eq!(codes(&report.issues), vec!["delta-missing"]);
    }

    #[test]
    fn test_malformed_rename_is_exactly_one_error() {
        let text = "\
## Why
This is a sufficiently long explanation of the motivation for this change.

## What Changes
- user-auth: renamed
";
        let report = validate_to_report(&change(text), None, &ValidateOptions::default());
        assert_eq!(codes(&report.issues), vec!["delta-rename-incomplete"]);
        assert!(report.issues[0].message.contains("user-auth"));
    }

    #[test]
    fn test_missing_sections_on_change() {
        let issues = validate(&change("prose only\n"), None, &ValidateOptions::default());
        assert_eq!(codes(&issues), vec!["why-missing", "what-changes-missing"]);
    }

    #[test]
    fn test_strict_issue_set_is_superset() {
        let text = "\
## Why
too short

## What Changes
- **auth:** Add requirement
";
        let relaxed = validate(&change(text), None, &ValidateOptions { strict: false });
        let strict = validate(&change(text), None, &ValidateOptions { strict: true });
        assert_eq!(relaxed.len(), strict.len());
        for (a, b) in relaxed.iter().zip(strict.iter()) {
            assert_eq!(a.code, b.code);
            assert!(b.severity >= a.severity);
        }
    }

    #[test]
    fn test_panicking_rule_becomes_synthetic_issue() {
        struct Exploding;
        impl Rule for Exploding {
            fn name(&self) -> &'static str {
                "exploding"
            }
            fn evaluate(&self, _ctx: &RuleContext) -> Vec<Issue> {
                panic!("boom");
            }
        }

        struct AfterExploding;
        impl Rule for AfterExploding {
            fn name(&self) -> &'static str {
                "after-exploding"
            }
            fn evaluate(&self, _ctx: &RuleContext) -> Vec<Issue> {
                vec![Issue::warning("still-ran", "later rules keep running")]
            }
        }

        let doc = change("## Why\nLong enough explanation to not trip the length rule here.\n\n## What Changes\n- **auth:** Add x\n");
        let ctx = RuleContext {
            doc: &doc,
            deltas: None,
            strict: false,
        };

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(Exploding), Box::new(AfterExploding)];
        let issues = run_rules(&rules, &ctx);
        std::panic::set_hook(prev_hook);

        assert_eq!(codes(&issues), vec!["rule-failed", "still-ran"]);
        assert_eq!(issues[0].severity, Severity::Error);
        assert!(issues[0].message.contains("exploding"));
    }

    #[test]
    fn test_issue_order_is_stable_across_runs() {
        let text = "\
## Requirements

### Requirement: One

### Requirement: One
";
        let a = validate(&spec(text), None, &ValidateOptions::default());
        let b = validate(&spec(text), None, &ValidateOptions::default());
        assert_eq!(a, b);
        // Structural codes come before per-requirement codes, per
        // registration order.
        assert_eq!(
            codes(&a),
            vec![
                "purpose-missing",
                "requirement-empty",
                "requirement-empty",
                "requirement-no-scenario",
                "requirement-no-scenario",
                "requirement-duplicate",
            ]
        );
    }
}
