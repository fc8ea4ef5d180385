//! Test fixtures for on-disk layouts.
//!
//! Provides a throwaway directory tree shaped like a deployment so tests can
//! point an [`EddyConfig`] at it.

use std::path::Path;

use crate::config::EddyConfig;

/// Creates a temporary deployment tree and a configuration pointing into it.
///
/// The videos and static directories exist; the database directory is left for
/// the metadata store to create.
///
/// # Panics
///
/// Panics if the temporary directories cannot be created.
/// This is acceptable in test fixtures where failures indicate environment issues.
pub fn create_temp_deployment() -> (tempfile::TempDir, EddyConfig) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = EddyConfig::rooted_at(temp_dir.path());

    std::fs::create_dir_all(&config.storage.videos_dir).unwrap();
    std::fs::create_dir_all(&config.storage.static_dir).unwrap();

    (temp_dir, config)
}

/// Writes a static asset relative to the static root, creating parents.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_static_asset(config: &EddyConfig, relative: &str, contents: &[u8]) {
    let path = config.storage.static_dir.join(Path::new(relative));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_deployment_layout() {
        let (_temp_dir, config) = create_temp_deployment();

        assert!(config.storage.videos_dir.is_dir());
        assert!(config.storage.static_dir.is_dir());
        assert!(!config.storage.database_dir.exists());
    }

    #[test]
    fn test_write_static_asset() {
        let (_temp_dir, config) = create_temp_deployment();
        write_static_asset(&config, "assets/app.js", b"console.log(1)");

        let written = std::fs::read(config.storage.static_dir.join("assets/app.js")).unwrap();
        assert_eq!(written, b"console.log(1)");
    }
}
