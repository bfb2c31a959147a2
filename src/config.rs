//! Configuration: `shoebox.toml` loading and defaults.
//!
//! All options are optional — a missing file, or a file overriding a single
//! key, both work. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # Defaults shown.
//!
//! [import]
//! recurse = true             # Descend into subdirectories when importing
//! follow_symlinks = false    # Traverse symlinked directories
//! compute_checksums = true   # Hash imported files (needed for dup-skip)
//! skip_duplicates = true     # Skip files already in the collection
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Conventional config filename, looked up in the working directory when no
/// explicit path is given.
pub const CONFIG_FILENAME: &str = "shoebox.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Top-level configuration. Sections are sparse: specify only what you
/// want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShoeboxConfig {
    pub import: ImportConfig,
}

/// How directory imports behave.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Descend into subdirectories of the import root.
    pub recurse: bool,
    /// Traverse symlinked directories while walking.
    pub follow_symlinks: bool,
    /// Compute a content checksum for every imported file. Disabling this
    /// speeds up imports from slow media but turns off duplicate detection
    /// by content.
    pub compute_checksums: bool,
    /// Skip candidates whose checksum or location is already present in
    /// the collection.
    pub skip_duplicates: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            recurse: true,
            follow_symlinks: false,
            compute_checksums: true,
            skip_duplicates: true,
        }
    }
}

impl ShoeboxConfig {
    /// Loads configuration from a specific file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads `shoebox.toml` from `dir` when present, stock defaults
    /// otherwise. A malformed file is an error, not a silent fallback.
    pub fn load_or_default(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILENAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = ShoeboxConfig::default();
        assert!(config.import.recurse);
        assert!(config.import.compute_checksums);
        assert!(config.import.skip_duplicates);
        assert!(!config.import.follow_symlinks);
    }

    #[test]
    fn sparse_override_keeps_other_defaults() {
        let config: ShoeboxConfig = toml::from_str("[import]\nrecurse = false\n").unwrap();
        assert!(!config.import.recurse);
        assert!(config.import.skip_duplicates);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ShoeboxConfig, _> = toml::from_str("[import]\nrecure = true\n");
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ShoeboxConfig::load_or_default(tmp.path()).unwrap();
        assert!(config.import.recurse);
    }
}
