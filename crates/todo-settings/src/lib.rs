//! # todo-settings
//!
//! Layered configuration for the to-do backend, built on `figment`.
//!
//! Settings come from three layers (in priority order):
//! 1. **Compiled defaults**: [`TodoSettings::default()`]
//! 2. **Settings file**: `~/.todo/settings.json` or a path given on the command line
//! 3. **Environment variables**: `TODO_*` overrides (highest priority)
//!
//! Command-line flags are applied on top by the binary.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{ENV_PREFIX, expand_home, figment, load_settings, settings_path, validate};
pub use types::{DatabaseSettings, LoggingSettings, ServerSettings, TodoSettings};
