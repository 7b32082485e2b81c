//! CLI: clap definitions and command execution for the `reposync` binary.

use crate::concurrency::WorkerPool;
use crate::config::{ConfigLoader, ReposyncConfig};
use crate::error::SyncError;
use crate::remote::GitHubClient;
use crate::sync::{prepare, run_sync, PreparedSync, SyncReport};
use crate::tree::Scanner;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;
use std::path::PathBuf;

/// Mirror a remote repository tree onto a local directory
#[derive(Parser, Debug)]
#[command(name = "reposync", version)]
#[command(about = "Mirror a remote repository tree onto a local directory")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (replaces the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repository owner
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Ref to mirror (heads/<branch>, tags/<tag>, or a bare branch name)
    #[arg(long = "ref", global = true)]
    pub reference: Option<String>,

    /// Local directory to reconcile
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Maximum concurrent file operations
    #[arg(short = 'j', long, global = true)]
    pub max_concurrent: Option<usize>,

    /// API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// API base URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Reconcile the local directory with the remote revision
    Sync {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show what a sync would do without touching the filesystem
    Plan {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the local snapshot (hash and path of every file)
    Scan {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    /// Load configuration and apply flag overrides.
    pub fn load_config(&self) -> Result<ReposyncConfig, SyncError> {
        let mut config = match &self.config {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Precedence: flags override config file override defaults.
    pub fn apply_overrides(&self, config: &mut ReposyncConfig) {
        if let Some(owner) = &self.owner {
            config.remote.owner = owner.clone();
        }
        if let Some(repo) = &self.repo {
            config.remote.repo = repo.clone();
        }
        if let Some(reference) = &self.reference {
            config.remote.reference = reference.clone();
        }
        if let Some(api_url) = &self.api_url {
            config.remote.api_url = api_url.clone();
        }
        if let Some(token) = &self.token {
            config.remote.token = Some(token.clone());
        }
        if let Some(root) = &self.root {
            config.sync.local_root = root.clone();
        }
        if let Some(max) = self.max_concurrent {
            config.sync.max_concurrent = max;
        }

        let logging = &mut config.logging;
        if self.quiet {
            logging.enabled = false;
        }
        if self.verbose {
            logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

/// Result of running a command
#[derive(Debug)]
pub struct CommandOutput {
    pub text: String,
    /// False when the command completed but some operations failed
    pub success: bool,
}

/// Executes parsed commands against a loaded configuration
pub struct RunContext {
    config: ReposyncConfig,
}

impl RunContext {
    pub fn new(config: ReposyncConfig) -> Self {
        Self { config }
    }

    pub async fn execute(&self, command: &Commands) -> Result<CommandOutput, SyncError> {
        match command {
            Commands::Sync { format } => {
                let client = self.client()?;
                let report = run_sync(&client, &self.config.sync_request()).await?;
                Ok(CommandOutput {
                    success: report.is_success(),
                    text: render_report(&report, *format),
                })
            }
            Commands::Plan { format } => {
                let client = self.client()?;
                let request = self.config.sync_request();
                let pool = WorkerPool::new(request.max_concurrent);
                let prepared = prepare(&client, &request, &pool).await?;
                Ok(CommandOutput {
                    success: true,
                    text: render_plan(&prepared, *format),
                })
            }
            Commands::Scan { format } => {
                let pool = WorkerPool::new(self.config.sync.max_concurrent);
                let snapshot = Scanner::new(self.config.sync.local_root.clone(), pool)
                    .scan()
                    .await?;
                let text = match format {
                    OutputFormat::Text => snapshot
                        .iter()
                        .map(|(path, hash)| format!("{} {}", hash, path))
                        .collect::<Vec<_>>()
                        .join("\n"),
                    OutputFormat::Json => {
                        let files: serde_json::Map<String, serde_json::Value> = snapshot
                            .iter()
                            .map(|(path, hash)| (path.to_string(), json!(hash)))
                            .collect();
                        serde_json::Value::Object(files).to_string()
                    }
                };
                Ok(CommandOutput {
                    success: true,
                    text,
                })
            }
        }
    }

    fn client(&self) -> Result<GitHubClient, SyncError> {
        self.config.ensure_valid()?;
        Ok(GitHubClient::new(
            Some(self.config.remote.api_url.clone()),
            self.config.resolved_token(),
        )?)
    }
}

/// Render a sync report: one line per operation, then a summary
pub fn render_report(report: &SyncReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => report.to_json().to_string(),
        OutputFormat::Text => {
            let mut lines: Vec<String> = report.outcomes.iter().map(|o| o.describe()).collect();
            lines.push(format!(
                "revision {}: {} downloaded, {} deleted, {} unchanged, {} failed",
                report.revision,
                report.count(crate::sync::Action::Download),
                report.count(crate::sync::Action::Delete),
                report.unchanged,
                report.failed_count()
            ));
            lines.join("\n")
        }
    }
}

/// Render a dry-run plan
pub fn render_plan(prepared: &PreparedSync, format: OutputFormat) -> String {
    let plan = &prepared.plan;
    match format {
        OutputFormat::Json => json!({
            "revision": prepared.revision,
            "plan": plan,
        })
        .to_string(),
        OutputFormat::Text => {
            let mut lines: Vec<String> = plan
                .to_delete
                .iter()
                .map(|path| format!("delete {}", path))
                .collect();
            lines.extend(
                plan.to_download
                    .iter()
                    .map(|task| format!("download {} ({})", task.path, task.remote_hash.short())),
            );
            lines.push(format!(
                "revision {}: {} to download, {} to delete, {} unchanged",
                prepared.revision,
                plan.to_download.len(),
                plan.to_delete.len(),
                plan.unchanged
            ));
            lines.join("\n")
        }
    }
}
