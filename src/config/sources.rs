//! Config sources and merge order: defaults, config file, environment.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path to the global config file: `<config_dir>/config.toml`
/// (`~/.config/reposync/config.toml` on Linux).
pub fn global_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "reposync")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Create a Config builder with defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("remote.reference", "heads/master")?
        .set_default("remote.api_url", crate::remote::github::GITHUB_API_URL)?
        .set_default("sync.local_root", ".")?
        .set_default("sync.max_concurrent", crate::concurrency::DEFAULT_MAX_CONCURRENT as i64)
}

/// Add the global config file if it exists.
pub fn add_global_file(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    match global_config_path() {
        Some(path) if path.exists() => {
            debug!(config_path = %path.display(), "Loading global config");
            builder.add_source(File::from(path).format(FileFormat::Toml).required(false))
        }
        _ => builder,
    }
}

/// Add an explicit config file; it must exist.
pub fn add_file(
    builder: ConfigBuilder<DefaultState>,
    path: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }
    Ok(builder.add_source(File::from(path).format(FileFormat::Toml).required(true)))
}

/// Add `REPOSYNC__SECTION__KEY` environment overrides.
pub fn add_environment(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix("REPOSYNC")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
