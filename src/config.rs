//! Configuration management for the changeset checker.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional TOML settings file (explicit, project, then user-global)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Deserialize;

use crate::context::ChangesetContext;
use crate::parser::ChangesetKey;

/// Settings file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".changeset-check.toml";

/// Report rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Command-line arguments for the changeset checker
#[derive(Debug, Parser)]
#[command(name = "changeset-check")]
#[command(about = "Structural checks for formatted SQL changelogs")]
#[command(version)]
pub struct Args {
    /// Changelog file containing the changeset
    pub file: PathBuf,

    /// Changeset being applied, as author:id
    #[arg(long, conflicts_with_all = ["author", "id"])]
    pub changeset: Option<String>,

    /// Changeset author
    #[arg(long, requires = "id")]
    pub author: Option<String>,

    /// Changeset id
    #[arg(long, requires = "author")]
    pub id: Option<String>,

    /// Report format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Settings file to use instead of the discovered one
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// Contents of a settings file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub extensions: Option<Vec<String>>,
    pub format: Option<OutputFormat>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// File extensions that are validated; others are skipped
    pub extensions: Vec<String>,
    pub format: OutputFormat,
    pub log_level: String,
    /// Settings file that was applied, if any
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extensions: vec!["sql".to_string()],
            format: OutputFormat::Text,
            log_level: "info".to_string(),
            config_path: None,
        }
    }
}

impl Config {
    /// Create configuration and changeset context from the command line
    pub fn from_args_and_env() -> Result<(Self, ChangesetContext)> {
        let args = Args::parse();
        let project_dir = std::env::current_dir().context("Failed to resolve working directory")?;
        Self::from_args(args, &project_dir)
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args, project_dir: &Path) -> Result<(Self, ChangesetContext)> {
        let mut config = Config::default();

        if let Some(path) = discover_config_file(args.config.as_deref(), project_dir) {
            let file = FileConfig::load(&path)?;
            config.apply(file);
            config.config_path = Some(path);
        }

        // CLI flags win over the settings file
        if let Some(format) = args.format {
            config.format = format;
        }
        if let Some(level) = args.log_level {
            config.log_level = level;
        }

        let context = match args.changeset {
            Some(text) => {
                let key = ChangesetKey::parse(&text)?;
                ChangesetContext::new(Some(key.author), Some(key.id), args.file)
            }
            None => ChangesetContext::new(args.author, args.id, args.file),
        };

        Ok((config, context))
    }

    fn apply(&mut self, file: FileConfig) {
        if let Some(extensions) = file.extensions {
            self.extensions = extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect();
        }
        if let Some(format) = file.format {
            self.format = format;
        }
        if let Some(level) = file.log_level {
            self.log_level = level;
        }
    }

    /// Whether a file's extension is one that gets validated
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }
}

/// Pick the settings file: explicit path, then the project file, then the
/// user-global one. Discovered files must exist; an explicit one is always
/// returned so a missing file is reported.
pub fn discover_config_file(explicit: Option<&Path>, project_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let project = project_dir.join(PROJECT_CONFIG_FILE);
    if project.is_file() {
        return Some(project);
    }

    dirs::config_dir()
        .map(|dir| dir.join("changeset-check").join("config.toml"))
        .filter(|path| path.is_file())
}
