// src/cli/bookmark_commands.rs
use crate::cli::args::{Cli, Commands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::import_commands::{print_outcome, ImportSession, TerminalPrompt};
use crate::config::{PermissionPolicy, Settings};
use crate::domain::error::DomainError;
use crate::domain::import_source::{ImportIntent, ImportSource};
use crate::domain::stream::AccessStrategy;
use crate::exitcode;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::repositories::sqlite::repository::SqliteBookmarkImporter;
use crossterm::style::Stylize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

fn parse_locator(locator: Option<&String>) -> CliResult<Option<ImportSource>> {
    locator
        .map(|l| ImportSource::parse(l))
        .transpose()
        .map_err(|e| CliError::InvalidInput(e.to_string()))
}

#[instrument(skip_all)]
pub fn import(cli: Cli, settings: &Settings) -> CliResult<i32> {
    let Some(Commands::Import {
        locator,
        extra_stream,
        yes,
    }) = cli.command
    else {
        return Ok(exitcode::USAGE);
    };

    let intent = ImportIntent::new(
        parse_locator(locator.as_ref())?,
        parse_locator(extra_stream.as_ref())?,
    );
    debug!(?intent, "Import requested");

    let mut services = ServiceContainer::new(settings)?;
    let permission_requests = services
        .take_permission_requests()
        .ok_or_else(|| CliError::Other("Permission requests already taken".to_string()))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Other(format!("Failed to create async runtime: {}", e)))?;

    let outcome = rt.block_on(async {
        let presenter =
            crate::application::ImportPresenter::spawn(services.presenter_deps());
        let session = ImportSession::new(
            presenter.clone(),
            services.permissions.clone(),
            permission_requests,
            Arc::new(TerminalPrompt),
            yes,
        );
        let outcome = session.run(intent).await;
        let _ = presenter.shutdown();
        outcome
    })?;

    print_outcome(outcome);
    Ok(outcome.exit_code())
}

/// Resolve and decode without touching the database.
///
/// Mirrors the import fallback without prompting: the stream path is only
/// tried when the configured policy already grants storage access.
#[instrument(skip_all)]
pub fn preview(cli: Cli, settings: &Settings) -> CliResult<i32> {
    let Some(Commands::Preview { locator }) = cli.command else {
        return Ok(exitcode::USAGE);
    };
    let source = ImportSource::parse(&locator).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let pipeline = ServiceContainer::create_pipeline(settings);

    let result = match pipeline.resolve_and_decode(&source, AccessStrategy::DirectDescriptor) {
        Ok(data) => Ok(data),
        Err(e) if settings.storage_permission == PermissionPolicy::Granted => {
            debug!("Direct access failed ({}), using stream copy", e);
            pipeline.resolve_and_decode(&source, AccessStrategy::StreamCopy)
        }
        Err(e) => {
            debug!("Direct access failed: {}", e);
            Err(DomainError::PermissionDenied)
        }
    };

    match result {
        Ok(data) => {
            let data = data.unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(exitcode::SUCCESS)
        }
        Err(DomainError::PermissionDenied) => {
            eprintln!(
                "{}",
                "Error: Storage permission is required to read this file".red()
            );
            Ok(exitcode::PERMISSION)
        }
        Err(e) => {
            eprintln!("{}", format!("Error: {}", e).red());
            Ok(exitcode::DATAERR)
        }
    }
}

pub fn create_db(cli: Cli) -> CliResult<i32> {
    let Some(Commands::CreateDb { path }) = cli.command else {
        return Ok(exitcode::USAGE);
    };

    // Check if the database file already exists
    if Path::new(&path).exists() {
        return Err(CliError::InvalidInput(format!(
            "Database already exists at: {}. Please choose a different path or delete the existing file.",
            path
        )));
    }

    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(&path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::Io(std::io::Error::other(format!(
                    "Failed to create parent directories: {}",
                    e
                )))
            })?;
        }
    }

    println!("Creating new database at: {}", path);

    // Runs migrations to set up the schema
    SqliteBookmarkImporter::from_url(&path)
        .map_err(|e| CliError::from(e).context("Failed to create database"))?;

    println!("Database created successfully at: {}", path);
    Ok(exitcode::SUCCESS)
}

pub fn show_config(settings: &Settings) -> CliResult<i32> {
    print!("{}", toml::to_string_pretty(settings)?);
    Ok(exitcode::SUCCESS)
}
