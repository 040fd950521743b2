//! Locating and loading spec and change documents on disk.
//!
//! All file I/O lives here and in the command layer; the engine modules
//! only ever see in-memory text. Layout:
//!
//! ```text
//! writ/
//!   specs/<spec-id>/spec.md
//!   changes/<change-id>/proposal.md
//! ```

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{parse, DocumentKind, ParsedDocument};
use crate::paths::{CHANGES_DIR, PROPOSAL_FILE, SPECS_DIR, SPEC_FILE};

/// Walk up from `start` looking for a directory containing `writ/`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("writ").is_dir())
        .map(Path::to_path_buf)
}

/// IDs of every spec under `writ/specs`, sorted for stable output.
pub fn list_specs(root: &Path) -> Result<Vec<String>> {
    list_ids(&root.join(SPECS_DIR), SPEC_FILE)
}

/// IDs of every change under `writ/changes`, sorted for stable output.
pub fn list_changes(root: &Path) -> Result<Vec<String>> {
    list_ids(&root.join(CHANGES_DIR), PROPOSAL_FILE)
}

fn list_ids(dir: &Path, marker: &str) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.path().join(marker).is_file() {
            continue;
        }
        if let Some(id) = entry.file_name().to_str() {
            ids.push(id.to_string());
        }
    }
    ids.sort();
    Ok(ids)
}

pub fn spec_path(root: &Path, id: &str) -> PathBuf {
    root.join(SPECS_DIR).join(id).join(SPEC_FILE)
}

pub fn change_path(root: &Path, id: &str) -> PathBuf {
    root.join(CHANGES_DIR).join(id).join(PROPOSAL_FILE)
}

/// Read and parse `writ/specs/<id>/spec.md`.
pub fn load_spec(root: &Path, id: &str) -> Result<ParsedDocument> {
    let path = spec_path(root, id);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read spec '{}' from {}", id, path.display()))?;
    Ok(parse(&text, DocumentKind::Spec))
}

/// Read and parse `writ/changes/<id>/proposal.md`.
pub fn load_change(root: &Path, id: &str) -> Result<ParsedDocument> {
    let path = change_path(root, id);
    let text = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read change '{}' from {}", id, path.display()))?;
    Ok(parse(&text, DocumentKind::ChangeProposal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_change(root: &Path, id: &str, content: &str) {
        let dir = root.join(CHANGES_DIR).join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(PROPOSAL_FILE), content).unwrap();
    }

    fn write_spec(root: &Path, id: &str, content: &str) {
        let dir = root.join(SPECS_DIR).join(id);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SPEC_FILE), content).unwrap();
    }

    #[test]
    fn test_find_project_root_walks_ancestors() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("writ/specs")).unwrap();
        let nested = tmp.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let root = find_project_root(&nested).unwrap();
        assert_eq!(root, tmp.path());
    }

    #[test]
    fn test_find_project_root_none_when_uninitialized() {
        let tmp = TempDir::new().unwrap();
        assert!(find_project_root(tmp.path()).is_none());
    }

    #[test]
    fn test_listing_is_sorted_and_skips_stray_dirs() {
        let tmp = TempDir::new().unwrap();
        write_change(tmp.path(), "b-change", "## Why\nx\n");
        write_change(tmp.path(), "a-change", "## Why\nx\n");
        // A directory without a proposal is not a change.
        fs::create_dir_all(tmp.path().join(CHANGES_DIR).join("not-a-change")).unwrap();

        let ids = list_changes(tmp.path()).unwrap();
        assert_eq!(ids, vec!["a-change", "b-change"]);
    }

    #[test]
    fn test_list_empty_when_dirs_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(list_specs(tmp.path()).unwrap().is_empty());
        assert!(list_changes(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_parses_with_the_right_kind() {
        let tmp = TempDir::new().unwrap();
        write_spec(tmp.path(), "auth", "## Purpose\nAuth.\n");
        write_change(tmp.path(), "add-2fa", "## Why\nSecurity.\n");

        let spec = load_spec(tmp.path(), "auth").unwrap();
        assert_eq!(spec.kind, DocumentKind::Spec);
        let change = load_change(tmp.path(), "add-2fa").unwrap();
        assert_eq!(change.kind, DocumentKind::ChangeProposal);
    }

    #[test]
    fn test_load_missing_spec_errors_with_id() {
        let tmp = TempDir::new().unwrap();
        let err = load_spec(tmp.path(), "ghost").unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }
}
