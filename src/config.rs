//! Configuration System
//!
//! Layered configuration: built-in defaults, the user's global config file (or an explicit
//! file), then `REPOSYNC__SECTION__KEY` environment variables. CLI flags are applied on top
//! by the binary.

use crate::concurrency::DEFAULT_MAX_CONCURRENT;
use crate::error::SyncError;
use crate::logging::LoggingConfig;
use crate::remote::github::GITHUB_API_URL;
use crate::remote::RepositoryId;
use crate::sync::SyncRequest;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod sources;

pub use sources::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReposyncConfig {
    #[serde(default)]
    pub remote: RemoteConfig,

    #[serde(default)]
    pub sync: SyncSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which repository and revision to mirror
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub owner: String,

    #[serde(default)]
    pub repo: String,

    /// Ref to mirror, e.g. `heads/master` or `tags/v1.0`
    #[serde(default = "default_reference")]
    pub reference: String,

    /// API base URL (GitHub Enterprise installs use `https://host/api/v3`)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API token; falls back to the GITHUB_TOKEN environment variable
    #[serde(default)]
    pub token: Option<String>,
}

fn default_reference() -> String {
    "heads/master".to_string()
}

fn default_api_url() -> String {
    GITHUB_API_URL.to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            reference: default_reference(),
            api_url: default_api_url(),
            token: None,
        }
    }
}

/// Local side of the sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    #[serde(default = "default_local_root")]
    pub local_root: PathBuf,

    /// Bound on concurrent hashing, deletion and download operations
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_local_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_max_concurrent() -> usize {
    DEFAULT_MAX_CONCURRENT
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            local_root: default_local_root(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Remote(String),
    Sync(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Remote(msg) => write!(f, "remote: {}", msg),
            ValidationError::Sync(msg) => write!(f, "sync: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ReposyncConfig {
    /// Validate the entire configuration, reporting every problem found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.remote.owner.trim().is_empty() {
            errors.push(ValidationError::Remote("owner is required".to_string()));
        }
        if self.remote.repo.trim().is_empty() {
            errors.push(ValidationError::Remote("repo is required".to_string()));
        }
        if self.remote.reference.trim().is_empty() {
            errors.push(ValidationError::Remote("reference cannot be empty".to_string()));
        }
        let api_url = &self.remote.api_url;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            errors.push(ValidationError::Remote(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.remote.api_url
            )));
        }
        if self.sync.max_concurrent == 0 {
            errors.push(ValidationError::Sync(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.sync.local_root.as_os_str().is_empty() {
            errors.push(ValidationError::Sync("local_root cannot be empty".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and join all problems into one error
    pub fn ensure_valid(&self) -> Result<(), SyncError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            SyncError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })
    }

    /// Token from config, else GITHUB_TOKEN
    pub fn resolved_token(&self) -> Option<String> {
        self.remote
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()))
    }

    pub fn repository(&self) -> RepositoryId {
        RepositoryId::new(self.remote.owner.clone(), self.remote.repo.clone())
    }

    pub fn sync_request(&self) -> SyncRequest {
        SyncRequest::new(
            self.repository(),
            self.remote.reference.clone(),
            self.sync.local_root.clone(),
        )
        .with_max_concurrent(self.sync.max_concurrent)
    }
}

/// Loads [`ReposyncConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the global config file if present, then environment.
    pub fn load() -> Result<ReposyncConfig, SyncError> {
        let builder = sources::builder_with_defaults()?;
        let builder = sources::add_global_file(builder);
        let builder = sources::add_environment(builder);
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Defaults, then `path` (required), then environment. The global file is skipped.
    pub fn load_from_file(path: &Path) -> Result<ReposyncConfig, SyncError> {
        let builder = sources::builder_with_defaults()?;
        let builder = sources::add_file(builder, path)?;
        let builder = sources::add_environment(builder);
        Ok(builder.build()?.try_deserialize()?)
    }
}
