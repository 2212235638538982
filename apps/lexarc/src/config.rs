//! # Application Configuration
//!
//! Optional `lexarc.toml` next to the working directory. Command-line
//! flags always win over file values.
//!
//! ```toml
//! data_dir = "/var/lib/lexarc"
//! progress_every = 5000
//! ```

use lexarc_core::LexarcError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Values loadable from the config file. Everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Store root directory.
    pub data_dir: Option<PathBuf>,
    /// Emit import progress every N records.
    pub progress_every: Option<u64>,
}

impl AppConfig {
    /// Load the config file if it exists; a missing file is an empty
    /// config, a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, LexarcError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .map_err(|e| LexarcError::IoError(format!("cannot read {}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| LexarcError::IoError(format!("malformed {}: {e}", path.display())))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_config() {
        let config = AppConfig::load(Path::new("/nonexistent/lexarc.toml")).expect("load");
        assert!(config.data_dir.is_none());
        assert!(config.progress_every.is_none());
    }

    #[test]
    fn values_parse() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("lexarc.toml");
        std::fs::write(&path, "data_dir = \"/tmp/store\"\nprogress_every = 500\n")
            .expect("write");

        let config = AppConfig::load(&path).expect("load");
        assert_eq!(config.data_dir.as_deref(), Some(Path::new("/tmp/store")));
        assert_eq!(config.progress_every, Some(500));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("lexarc.toml");
        std::fs::write(&path, "data_dir = [not toml").expect("write");
        assert!(AppConfig::load(&path).is_err());
    }
}
