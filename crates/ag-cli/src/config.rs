//! CLI configuration.

use std::path::{Path, PathBuf};

use ag_core::config::DEFAULT_BASE_URL;
use ag_core::{ClientConfig, Concurrency};
use serde::{Deserialize, Serialize};

use crate::cli::GlobalArgs;

/// CLI configuration, stored in `~/.apigeecli/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Management API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Organization used when `--org` is not given.
    pub default_org: Option<String>,

    /// Environment used when `--env` is not given.
    pub default_env: Option<String>,

    /// Connections used when `--conn` is not given.
    pub default_conn: Option<usize>,

    /// Output format.
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_org: None,
            default_env: None,
            default_conn: None,
            output_format: OutputFormat::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from the default file.
    pub fn load() -> crate::CliResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads configuration from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> crate::CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| crate::CliError::Config(format!("failed to parse config: {e}")))
    }

    /// Saves configuration to the default file.
    pub fn save(&self) -> crate::CliResult<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves configuration to `path`.
    pub fn save_to(&self, path: &Path) -> crate::CliResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::CliError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Gets the configuration file path.
    pub fn config_path() -> crate::CliResult<PathBuf> {
        let home = dirs_next::home_dir()
            .ok_or_else(|| crate::CliError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(".apigeecli").join("config.toml"))
    }

    /// Builds the client configuration, flags taking precedence over the file.
    pub fn client_config(&self, args: &GlobalArgs) -> crate::CliResult<ClientConfig> {
        let org = args
            .org
            .clone()
            .or_else(|| self.default_org.clone())
            .filter(|org| !org.trim().is_empty())
            .ok_or_else(|| ag_core::Error::missing("organization (--org)"))?;

        let mut config = ClientConfig::new(org)
            .with_base_url(args.base_url.clone().unwrap_or_else(|| self.base_url.clone()));
        if let Some(env) = args.env.clone().or_else(|| self.default_env.clone()) {
            config = config.with_env(env);
        }
        if let Some(token) = args.token.clone() {
            config = config.with_token(token);
        }
        if let Some(conn) = self.default_conn {
            config = config.with_conn(Concurrency::new(conn)?);
        }
        Ok(config)
    }

    /// Gets the effective output format.
    pub fn effective_format(&self, arg: Option<OutputFormat>) -> OutputFormat {
        arg.unwrap_or(self.output_format)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON format.
    Json,
    /// Quiet (minimal output).
    Quiet,
}
