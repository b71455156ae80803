//! Configuration management commands.

use std::path::Path;

use ag_core::Concurrency;

use crate::cli::ConfigCommand;
use crate::config::OutputFormat;
use crate::output::{info, success};
use crate::CliConfig;

/// Runs a config command.
pub fn run_config(cmd: ConfigCommand, config: &mut CliConfig) -> crate::CliResult<()> {
    match cmd {
        ConfigCommand::Show => show_config(config),
        ConfigCommand::Set { key, value } => {
            let path = CliConfig::config_path()?;
            set_config(config, &key, &value, &path)?;
            success(&format!("Set {key} = {value}"));
            Ok(())
        }
        ConfigCommand::Path => {
            println!("{}", CliConfig::config_path()?.display());
            Ok(())
        }
    }
}

/// Shows the current configuration.
fn show_config(config: &CliConfig) -> crate::CliResult<()> {
    let config_path = CliConfig::config_path()?;

    info(&format!("Configuration file: {}", config_path.display()));
    println!();
    println!("base_url: {}", config.base_url);
    if let Some(org) = &config.default_org {
        println!("default_org: {org}");
    }
    if let Some(env) = &config.default_env {
        println!("default_env: {env}");
    }
    if let Some(conn) = config.default_conn {
        println!("default_conn: {conn}");
    }
    println!("output_format: {:?}", config.output_format);

    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Sets a configuration value and saves the file at `path`.
fn set_config(config: &mut CliConfig, key: &str, value: &str, path: &Path) -> crate::CliResult<()> {
    match key {
        "base_url" => {
            config.base_url = value.to_string();
        }
        "default_org" | "org" => {
            config.default_org = optional(value);
        }
        "default_env" | "env" => {
            config.default_env = optional(value);
        }
        "default_conn" | "conn" => {
            config.default_conn = match optional(value) {
                None => None,
                Some(value) => {
                    let conn: usize = value.parse().map_err(|_| {
                        crate::CliError::InvalidArgument(format!("connections must be a number: {value}"))
                    })?;
                    Some(Concurrency::new(conn)?.get())
                }
            };
        }
        "output_format" | "format" => {
            config.output_format = match value.to_lowercase().as_str() {
                "table" => OutputFormat::Table,
                "json" => OutputFormat::Json,
                "quiet" => OutputFormat::Quiet,
                _ => {
                    return Err(crate::CliError::InvalidArgument(format!(
                        "Unknown output format: {value}. Supported: table, json, quiet"
                    )));
                }
            };
        }
        _ => {
            return Err(crate::CliError::InvalidArgument(format!(
                "Unknown configuration key: {key}. Known keys: base_url, default_org, default_env, default_conn, output_format"
            )));
        }
    }

    config.save_to(path)
}
