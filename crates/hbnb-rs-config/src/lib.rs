//! Configuration models and loading for the hbnb console.
//!
//! This crate owns the config schema (storage location, console prompt) and
//! the JSON5 loading and validation logic used by the console binary.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Default file names and discovery helpers.
pub use loader::{DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE};
/// Configuration schema models.
pub use model::*;
