//! # Writ - Spec and Change Management
//!
//! Writ manages a project's specs (markdown documents describing a
//! capability's requirements and scenarios) and change proposals (markdown
//! documents describing deltas to apply to those specs).
//!
//! ## Core Concepts
//!
//! - **Specs**: `writ/specs/<id>/spec.md`, with a Purpose section and
//!   Requirements containing scenarios
//! - **Changes**: `writ/changes/<id>/proposal.md`, with a Why section and
//!   a What Changes delta list
//! - **Validation**: an ordered rule set that turns structural and
//!   semantic problems into stable, coded issues
//!
//! ## Modules
//!
//! - [`markdown`] - Line classification for the markdown subset writ uses
//! - [`document`] - Document model and tree building
//! - [`delta`] - Delta extraction from change proposals
//! - [`rules`] - The validation rule engine
//! - [`report`] - Report aggregation and JSON/text rendering
//! - [`discovery`] - Locating and loading documents on disk
//!
//! The engine modules (`markdown` through `report`) are pure functions of
//! their input text and options: no I/O, no shared mutable state, and no
//! internal concurrency. Callers may validate many documents in parallel
//! with zero coordination.
//!
//! ## Example
//!
//! ```
//! use writ::document::{parse, DocumentKind};
//! use writ::rules::{validate_to_report, ValidateOptions};
//!
//! let text = "## Why\nShip faster.\n\n## What Changes\n- **auth:** Add 2FA\n";
//! let doc = parse(text, DocumentKind::ChangeProposal);
//! let report = validate_to_report(&doc, None, &ValidateOptions { strict: false });
//! assert!(report.valid);
//! ```

pub mod delta;
pub mod discovery;
pub mod document;
pub mod markdown;
pub mod report;
pub mod rules;

/// Default path constants for the writ directory structure.
pub mod paths {
    /// Directory containing spec documents: `writ/specs`
    pub const SPECS_DIR: &str = "writ/specs";
    /// Directory containing change proposals: `writ/changes`
    pub const CHANGES_DIR: &str = "writ/changes";
    /// Spec document filename within its directory
    pub const SPEC_FILE: &str = "spec.md";
    /// Change proposal filename within its directory
    pub const PROPOSAL_FILE: &str = "proposal.md";
}
