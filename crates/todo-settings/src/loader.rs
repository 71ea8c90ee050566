//! Settings loading.
//!
//! Layers, lowest to highest priority:
//! 1. Compiled [`TodoSettings::default()`]
//! 2. JSON settings file (`~/.todo/settings.json` unless a path is given)
//! 3. `TODO_*` environment variables, `__` separating nesting levels
//!    (`TODO_SERVER__PORT=9000` sets `server.port`)

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized};
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::TodoSettings;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "TODO_";

/// `$HOME`, or `/tmp` when unset.
pub fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

/// Default settings file (`~/.todo/settings.json`).
pub fn settings_path() -> PathBuf {
    home_dir().join(".todo").join("settings.json")
}

/// Resolve a leading `~` against [`home_dir`].
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => home_dir(),
        Some(rest) if rest.starts_with('/') => home_dir().join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// Build the provider chain over `settings_file`. A missing file contributes
/// nothing.
pub fn figment(settings_file: &Path) -> Figment {
    Figment::from(Serialized::defaults(TodoSettings::default()))
        .merge(Json::file(settings_file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load and validate settings.
///
/// With `explicit = None` the default file is used if present. An explicit
/// path must exist.
pub fn load_settings(explicit: Option<&Path>) -> Result<TodoSettings> {
    let path = match explicit {
        Some(path) if !path.exists() => {
            return Err(SettingsError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => settings_path(),
    };
    debug!(path = %path.display(), exists = path.exists(), "loading settings");

    let settings: TodoSettings = figment(&path).extract()?;
    validate(&settings)?;
    Ok(settings)
}

/// Reject values that parse but cannot work.
pub fn validate(settings: &TodoSettings) -> Result<()> {
    if settings.server.port == 0 {
        return Err(SettingsError::InvalidValue {
            field: "server.port",
            reason: "must be between 1 and 65535".into(),
        });
    }
    if settings.database.pool_size == 0 {
        return Err(SettingsError::InvalidValue {
            field: "database.pool_size",
            reason: "must be at least 1".into(),
        });
    }
    if settings.database.path.trim().is_empty() {
        return Err(SettingsError::InvalidValue {
            field: "database.path",
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
