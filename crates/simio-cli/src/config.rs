use crate::error::Result;
use simio::engine::config::IoConfig;
use std::path::Path;
use tracing::{debug, info};

/// Loads the I/O settings from `path`, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<IoConfig> {
    match path {
        Some(path) => {
            let config = IoConfig::load(path)?;
            info!("Loaded I/O configuration from '{}'.", path.display());
            debug!("I/O configuration: {:?}", config);
            Ok(config)
        }
        None => {
            debug!("No configuration file given; using default I/O settings.");
            Ok(IoConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use simio::core::types::Precision;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_path_gives_defaults() {
        assert_eq!(load_config(None).unwrap(), IoConfig::default());
    }

    #[test]
    fn file_settings_are_applied() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("simio.toml");
        fs::write(&path, "precision = \"double\"\nmax-backups = 3\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.precision, Precision::Double);
        assert_eq!(config.max_backups, 3);
    }

    #[test]
    fn bad_file_is_a_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("simio.toml");
        fs::write(&path, "compression = true\n").unwrap();
        assert!(matches!(load_config(Some(&path)), Err(CliError::Config(_))));
    }
}
