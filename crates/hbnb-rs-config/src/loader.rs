//! JSON5 config loading with cwd/user discovery.

use crate::{ConfigError, HbnbConfig};
use directories::UserDirs;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config filename in the cwd or the user config directory.
pub const DEFAULT_CONFIG_FILE: &str = "hbnb.json5";
/// Default config directory under the user's home.
pub const DEFAULT_CONFIG_DIR: &str = ".hbnb";

impl HbnbConfig {
    /// Load a single config from a path.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config (path={})", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        let config: HbnbConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the first config found in `cwd` or the user config directory.
    ///
    /// Falls back to defaults when neither location holds a config file.
    pub fn load_default(cwd: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let candidates = [
            Some(cwd.as_ref().join(DEFAULT_CONFIG_FILE)),
            default_user_config_path(),
        ];
        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load_from_path(&path);
            }
            debug!("config candidate missing (path={})", path.display());
        }
        info!("no config file found; using defaults");
        Ok(Self::default())
    }

    /// Check field-level constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "storage.path",
                problem: "must name a backing file",
            });
        }
        if self.console.prompt.is_empty() {
            return Err(ConfigError::InvalidField {
                field: "console.prompt",
                problem: "must not be empty",
            });
        }
        Ok(())
    }
}

/// `~/.hbnb/hbnb.json5`, when a home directory can be resolved.
fn default_user_config_path() -> Option<PathBuf> {
    UserDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn parse_minimal_config() {
        let config = HbnbConfig::load_from_str("{}").expect("config");
        assert_eq!(config, HbnbConfig::default());
        assert_eq!(config.storage.path, PathBuf::from("file.json"));
        assert_eq!(config.console.prompt, "(hbnb) ");
    }

    #[test]
    fn parses_json5_with_comments_and_overrides() {
        let json5 = r#"{
            // where records live
            storage: { path: "data/objects.json", pretty: true },
            console: { prompt: "> " },
        }"#;
        let config = HbnbConfig::load_from_str(json5).expect("config");
        assert_eq!(config.storage.path, PathBuf::from("data/objects.json"));
        assert!(config.storage.pretty);
        assert_eq!(config.console.prompt, "> ");
        assert!(!config.console.echo);
    }

    #[test]
    fn rejects_unknown_top_level_key() {
        let err = HbnbConfig::load_from_str("{ unexpected: true }").unwrap_err();
        assert!(matches!(err, ConfigError::Schema(_)));
        assert!(format!("{err}").contains("unexpected"));
    }

    #[test]
    fn rejects_empty_prompt() {
        let err = HbnbConfig::load_from_str(r#"{ console: { prompt: "" } }"#).unwrap_err();
        match err {
            ConfigError::InvalidField { field, .. } => assert_eq!(field, "console.prompt"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_empty_storage_path() {
        let err = HbnbConfig::load_from_str(r#"{ storage: { path: "" } }"#).unwrap_err();
        match err {
            ConfigError::InvalidField { field, .. } => assert_eq!(field, "storage.path"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn load_default_prefers_cwd_config() {
        let temp = TempDir::new().expect("tmp");
        fs::write(
            temp.path().join(DEFAULT_CONFIG_FILE),
            r#"{ storage: { path: "cwd.json" } }"#,
        )
        .expect("write");
        let config = HbnbConfig::load_default(temp.path()).expect("config");
        assert_eq!(config.storage.path, PathBuf::from("cwd.json"));
    }

    #[test]
    fn load_from_path_reports_missing_file() {
        let temp = TempDir::new().expect("tmp");
        let err = HbnbConfig::load_from_path(temp.path().join("missing.json5")).unwrap_err();
        match err {
            ConfigError::Unreadable { path, .. } => assert!(path.ends_with("missing.json5")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_malformed_json5() {
        let err = HbnbConfig::load_from_str("{ storage: ").unwrap_err();
        assert!(matches!(err, ConfigError::Syntax(_)));
        assert!(err.to_string().starts_with("hbnb config is not valid JSON5"));
    }
}
