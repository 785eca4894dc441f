//! Configuration loader for Parley.
//!
//! Reads `parley.toml` and deserializes it into [`AppConfig`]. A missing
//! file means "all defaults"; a file that exists but cannot be read or parsed
//! is a startup error.

use std::path::{Path, PathBuf};

use anyhow::Context;
use parley_types::config::AppConfig;

/// File name looked up in the working directory.
const LOCAL_CONFIG_FILE: &str = "parley.toml";

/// Where a loaded [`AppConfig`] came from.
///
/// Config is loaded before the tracing subscriber exists (the debug flag
/// picks the log filter), so callers log this once logging is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the file.
    File,
    /// The file does not exist; every field has its default.
    Defaults,
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to read or parse, returns an error naming
///   the file.
pub async fn load_config(path: &Path) -> anyhow::Result<(AppConfig, ConfigSource)> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok((AppConfig::default(), ConfigSource::Defaults));
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read {}", path.display()));
        }
    };

    let config: AppConfig =
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok((config, ConfigSource::File))
}

/// Resolve which config file to load.
///
/// Priority:
/// 1. Explicit path (`--config` flag or `PARLEY_CONFIG`)
/// 2. `./parley.toml` if it exists
/// 3. `~/.parley/config.toml`
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return local;
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".parley").join("config.toml");
    }

    local
}
