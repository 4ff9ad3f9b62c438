//! Temporary directories holding grid sources.

use std::path::{Path, PathBuf};

/// Workspace root, two levels above this crate.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// A temporary directory that is removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("ocean_scene_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Write `contents` to `dir/name` and return the full path.
pub fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write test source");
    path
}

/// Serialise a payload into `dir/name`.
pub fn write_payload(dir: &Path, name: &str, payload: &ocean_common::GridPayload) -> PathBuf {
    let json = serde_json::to_string(payload).expect("payload serialises");
    write_source(dir, name, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_write_source() {
        let dir = temp_test_dir();
        let path = write_source(dir.path(), "a.json", "{}");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "{}");
        assert!(dir.path().to_string_lossy().contains("ocean_scene_"));
    }
}
