//! Entity commands shared by every kind.

use std::sync::Arc;

use ag_client::{
    delete_entity, export, get_entity, import_file, list_names, write_export_file, ApiClient,
    EntityKind, ImportSummary, Transport,
};
use ag_core::{ClientConfig, Concurrency, ExistingPolicy};

use crate::cli::{EntityCommand, ExportArgs, ImportArgs};
use crate::config::OutputFormat;
use crate::output::{confirm, error, info, output, output_single, success, warning, NameRow};

/// Runs an entity command against one kind.
pub async fn run_entity<K: EntityKind>(
    cmd: EntityCommand,
    kind: &K,
    config: ClientConfig,
    format: OutputFormat,
) -> crate::CliResult<()> {
    tracing::debug!(
        kind = kind.label(),
        org = %config.org,
        env = ?config.env,
        base_url = %config.base_url,
        "running entity command"
    );

    match cmd {
        EntityCommand::List => list(kind, &config, format).await,
        EntityCommand::Get { name } => {
            let client = ApiClient::new(&config)?;
            let body = get_entity(&client, kind, &config, &name).await?;
            output_single(&body, format)
        }
        EntityCommand::Delete { name, force } => delete(kind, &config, &name, force).await,
        EntityCommand::Export(args) => run_export(kind, config, args).await,
        EntityCommand::Import(args) => run_import(kind, config, args).await,
    }
}

async fn list<K: EntityKind>(kind: &K, config: &ClientConfig, format: OutputFormat) -> crate::CliResult<()> {
    let client = ApiClient::new(config)?;
    let rows: Vec<NameRow> = list_names(&client, kind, config)
        .await?
        .into_iter()
        .map(|name| NameRow { name })
        .collect();
    output(&rows, format)
}

async fn delete<K: EntityKind>(kind: &K, config: &ClientConfig, name: &str, force: bool) -> crate::CliResult<()> {
    let client = ApiClient::new(config)?;
    if !force && !confirm(&format!("Are you sure you want to delete {} '{}'?", kind.label(), name))? {
        error("Operation cancelled");
        return Ok(());
    }

    delete_entity(&client, kind, config, name).await?;
    success(&format!("{} '{}' deleted successfully", kind.label(), name));
    Ok(())
}

fn with_conn(config: ClientConfig, conn: Option<usize>) -> crate::CliResult<ClientConfig> {
    Ok(match conn {
        Some(conn) => config.with_conn(Concurrency::new(conn)?),
        None => config,
    })
}

/// Exports a whole collection to its export file.
///
/// The file holds everything that could be fetched even when some entities
/// failed; the failures are reported afterwards as the command's error.
async fn run_export<K: EntityKind>(kind: &K, config: ClientConfig, args: ExportArgs) -> crate::CliResult<()> {
    let config = with_conn(config, args.conn)?;
    let client: Arc<dyn Transport> = Arc::new(ApiClient::new(&config)?);

    info(&format!(
        "Exporting {} entities with {} connection(s)...",
        kind.label(),
        config.conn
    ));

    let report = export(client, kind, &config).await?;
    let path = write_export_file(&args.folder, kind, &report.payloads)?;
    success(&format!(
        "Exported {} {} entities to '{}'",
        report.payloads.len(),
        kind.label(),
        path.display()
    ));

    match report.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Imports a file into a collection and prints the summary.
async fn run_import<K: EntityKind>(kind: &K, config: ClientConfig, args: ImportArgs) -> crate::CliResult<()> {
    let existing = if args.skip_existing {
        ExistingPolicy::Skip
    } else {
        ExistingPolicy::Update
    };
    let config = with_conn(config, args.conn)?
        .with_existing_policy(existing)
        .with_conflict_policy(args.on_conflict);
    let client: Arc<dyn Transport> = Arc::new(ApiClient::new(&config)?);

    info(&format!(
        "Importing {} entities from '{}' with {} connection(s)...",
        kind.label(),
        args.file.display(),
        config.conn
    ));

    let report = import_file(client, kind, &config, &args.file).await?;
    let summary = report.summary();

    println!();
    if report.error.is_some() {
        warning("Import finished with errors");
    } else {
        success("Import complete!");
    }
    print_summary(&summary);

    match report.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn print_summary(summary: &ImportSummary) {
    println!("  Created:   {}", summary.created);
    println!("  Updated:   {}", summary.updated);
    println!("  Skipped:   {}", summary.skipped);
    println!("  Conflicts: {}", summary.conflicts);
    if summary.failed > 0 {
        println!("  Failed:    {}", summary.failed);
    }
}
