//! Command implementations.

pub mod config;
pub mod entity;

pub use config::run_config;
pub use entity::run_entity;

use ag_client::entities::{
    Apps, Developers, EnvGroups, Keystores, KvmEntries, KvmScope, Products, References, TargetServers,
};

use crate::cli::{Cli, Command, KvmArgs, MapLevel};
use crate::CliConfig;

/// Dispatches a parsed command line.
pub async fn run(cli: Cli, config: &mut CliConfig) -> crate::CliResult<()> {
    let format = config.effective_format(cli.global.format);

    match cli.command {
        Command::Config(cmd) => run_config(cmd, config),
        Command::Targetservers(cmd) => {
            run_entity(cmd, &TargetServers, config.client_config(&cli.global)?, format).await
        }
        Command::References(cmd) => {
            run_entity(cmd, &References, config.client_config(&cli.global)?, format).await
        }
        Command::Keystores(cmd) => {
            run_entity(cmd, &Keystores, config.client_config(&cli.global)?, format).await
        }
        Command::Products(cmd) => {
            run_entity(cmd, &Products, config.client_config(&cli.global)?, format).await
        }
        Command::Developers(cmd) => {
            run_entity(cmd, &Developers, config.client_config(&cli.global)?, format).await
        }
        Command::Apps(cmd) => run_entity(cmd, &Apps, config.client_config(&cli.global)?, format).await,
        Command::Envgroups(cmd) => {
            run_entity(cmd, &EnvGroups, config.client_config(&cli.global)?, format).await
        }
        Command::Kvm(KvmArgs {
            map,
            proxy,
            level,
            command,
        }) => {
            let scope = kvm_scope(proxy, level);
            let kind = KvmEntries::new(map, scope);
            run_entity(command, &kind, config.client_config(&cli.global)?, format).await
        }
    }
}

fn kvm_scope(proxy: Option<String>, level: MapLevel) -> KvmScope {
    match (proxy, level) {
        (Some(proxy), _) => KvmScope::Proxy(proxy),
        (None, MapLevel::Org) => KvmScope::Org,
        (None, MapLevel::Env) => KvmScope::Env,
    }
}
