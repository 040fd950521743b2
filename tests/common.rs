//! Common test helpers for integration tests

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Create a temp directory with the writ/ project skeleton.
pub fn setup_project() -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    fs::create_dir_all(tmp.path().join("writ/specs")).expect("create specs dir");
    fs::create_dir_all(tmp.path().join("writ/changes")).expect("create changes dir");
    tmp
}

/// Write `writ/specs/<id>/spec.md`.
pub fn write_spec(root: &Path, id: &str, content: &str) {
    let dir = root.join("writ/specs").join(id);
    fs::create_dir_all(&dir).expect("create spec dir");
    fs::write(dir.join("spec.md"), content).expect("write spec.md");
}

/// Write `writ/changes/<id>/proposal.md`.
pub fn write_change(root: &Path, id: &str, content: &str) {
    let dir = root.join("writ/changes").join(id);
    fs::create_dir_all(&dir).expect("create change dir");
    fs::write(dir.join("proposal.md"), content).expect("write proposal.md");
}
