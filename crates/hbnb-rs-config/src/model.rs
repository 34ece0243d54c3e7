//! Configuration schema for the hbnb console.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root config for the console and its storage engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HbnbConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

/// Backing file settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Location of the JSON backing file.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
    /// Pretty-print the backing file.
    #[serde(default)]
    pub pretty: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            pretty: false,
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("file.json")
}

/// Interactive console settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Prompt printed before each command in interactive mode.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Echo commands read from a non-interactive input.
    #[serde(default)]
    pub echo: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            echo: false,
        }
    }
}

fn default_prompt() -> String {
    "(hbnb) ".to_string()
}
