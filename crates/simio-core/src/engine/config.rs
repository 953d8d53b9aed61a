use crate::core::types::Precision;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Largest numbered backup tried before giving up on preserving a file.
pub const DEFAULT_MAX_BACKUPS: u32 = 99;

/// Defaults applied to every handle a [`FileRegistry`](super::registry::FileRegistry) opens.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct IoConfig {
    /// Real width used by binary codecs on new handles.
    pub precision: Precision,
    /// Annotate text output and report recoverable transfer failures.
    pub debug: bool,
    /// Rename an existing canonical-binary file before opening it for write.
    pub make_backups: bool,
    pub max_backups: u32,
    /// Offsets beyond this are reported as out of range in restart snapshots.
    pub offset_limit: u64,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            precision: Precision::default(),
            debug: false,
            make_backups: true,
            max_backups: DEFAULT_MAX_BACKUPS,
            offset_limit: i64::MAX as u64,
        }
    }
}

impl IoConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| ConfigLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn empty_document_yields_defaults() {
        let config = IoConfig::from_toml_str("").unwrap();
        assert_eq!(config, IoConfig::default());
        assert_eq!(config.max_backups, 99);
        assert!(config.make_backups);
    }

    #[test]
    fn keys_are_kebab_case() {
        let config = IoConfig::from_toml_str(
            "precision = \"double\"\ndebug = true\nmake-backups = false\nmax-backups = 5\noffset-limit = 1024\n",
        )
        .unwrap();
        assert_eq!(config.precision, Precision::Double);
        assert!(config.debug);
        assert!(!config.make_backups);
        assert_eq!(config.max_backups, 5);
        assert_eq!(config.offset_limit, 1024);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(IoConfig::from_toml_str("verbose = true\n").is_err());
    }

    #[test]
    fn load_reads_file_and_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("io.toml");
        fs::write(&path, "debug = true\n").unwrap();
        assert!(IoConfig::load(&path).unwrap().debug);

        let missing = dir.path().join("missing.toml");
        let err = IoConfig::load(&missing).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));

        fs::write(&path, "debug = \"maybe\"\n").unwrap();
        assert!(matches!(IoConfig::load(&path), Err(ConfigLoadError::Toml { .. })));
    }
}
