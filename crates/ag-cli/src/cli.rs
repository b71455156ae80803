//! CLI argument parsing.

use std::path::PathBuf;

use ag_core::ConflictPolicy;
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::OutputFormat;

/// agcli - batch export and import for the Apigee management API.
#[derive(Debug, Parser)]
#[command(name = "agcli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Connection settings shared by every command.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Connection and output options.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct GlobalArgs {
    /// Organization name (overrides config).
    #[arg(short, long, global = true, env = "APIGEE_ORG")]
    pub org: Option<String>,

    /// Environment name (overrides config).
    #[arg(short, long, global = true, env = "APIGEE_ENV")]
    pub env: Option<String>,

    /// Access token sent as bearer credential.
    #[arg(short, long, global = true, env = "APIGEE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Management API base URL (overrides config).
    #[arg(long, global = true, env = "APIGEE_BASE_URL")]
    pub base_url: Option<String>,

    /// Output format (overrides config).
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Target servers of an environment.
    #[command(subcommand)]
    Targetservers(EntityCommand),

    /// Keystore and truststore references of an environment.
    #[command(subcommand)]
    References(EntityCommand),

    /// Keystores of an environment.
    #[command(subcommand)]
    Keystores(EntityCommand),

    /// API products.
    #[command(subcommand)]
    Products(EntityCommand),

    /// App developers.
    #[command(subcommand)]
    Developers(EntityCommand),

    /// Developer apps.
    #[command(subcommand)]
    Apps(EntityCommand),

    /// Environment groups.
    #[command(subcommand)]
    Envgroups(EntityCommand),

    /// Entries of a key value map.
    Kvm(KvmArgs),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Operations available for every entity kind.
#[derive(Debug, Subcommand)]
pub enum EntityCommand {
    /// List entity names.
    List,

    /// Show one entity.
    Get {
        /// Entity name.
        name: String,
    },

    /// Delete one entity.
    Delete {
        /// Entity name.
        name: String,

        /// Skip confirmation.
        #[arg(short, long)]
        force: bool,
    },

    /// Export every entity to a JSON file.
    Export(ExportArgs),

    /// Import entities from a JSON file.
    Import(ImportArgs),
}

/// Export arguments.
#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Number of connections (overrides config, default 4).
    #[arg(short, long)]
    pub conn: Option<usize>,

    /// Folder the export file is written to.
    #[arg(long, default_value = ".")]
    pub folder: PathBuf,
}

/// Import arguments.
#[derive(Debug, clap::Args)]
pub struct ImportArgs {
    /// Input file.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Number of connections (overrides config, default 4).
    #[arg(short, long)]
    pub conn: Option<usize>,

    /// Leave entities that already exist untouched.
    #[arg(long)]
    pub skip_existing: bool,

    /// What to do when the API reports an entity as already existing.
    #[arg(long, default_value = "ignore")]
    pub on_conflict: ConflictPolicy,
}

/// Key value map selection.
#[derive(Debug, clap::Args)]
pub struct KvmArgs {
    /// Map name.
    #[arg(short, long)]
    pub map: String,

    /// Proxy that owns the map.
    #[arg(short, long, conflicts_with = "level")]
    pub proxy: Option<String>,

    /// Level of a map not owned by a proxy.
    #[arg(long, value_enum, default_value_t = MapLevel::Env)]
    pub level: MapLevel,

    /// Entry operation.
    #[command(subcommand)]
    pub command: EntityCommand,
}

/// Level of a key value map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MapLevel {
    /// Organization map.
    Org,
    /// Environment map.
    Env,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,

        /// Configuration value.
        value: String,
    },

    /// Print the configuration file path.
    Path,
}
