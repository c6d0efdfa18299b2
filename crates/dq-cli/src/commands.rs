//! Command implementations.

use std::path::PathBuf;

use anyhow::{Context, Result};

use dq_load::{MemoryLoader, SqliteLoader};
use dq_model::SourceKind;

use crate::cli::{RunArgs, SourcesArgs};
use crate::pipeline::{load_config, run_pipeline};
use crate::types::RunReport;

pub fn run_command(args: &RunArgs) -> Result<RunReport> {
    let config = load_config(&args.config)
        .with_context(|| format!("load config {}", args.config.display()))?;
    tracing::info!(sources = config.sources.len(), "configuration loaded");

    if args.dry_run {
        let mut loader = MemoryLoader::new();
        return Ok(run_pipeline(&config, &mut loader));
    }

    let database = args
        .database
        .clone()
        .or_else(|| config.defaults.database.clone())
        .unwrap_or_else(|| PathBuf::from("dq.db"));
    let mut loader = SqliteLoader::open(&database)
        .with_context(|| format!("open database {}", database.display()))?;
    Ok(run_pipeline(&config, &mut loader))
}

pub fn list_sources(args: &SourcesArgs) -> Result<()> {
    let config = load_config(&args.config)
        .with_context(|| format!("load config {}", args.config.display()))?;
    for source in &config.sources {
        let kind = match source.kind {
            SourceKind::Csv => "csv",
            SourceKind::ApiJson => "api_json",
        };
        println!(
            "{:<16} {:<8} -> {:<16} ({} schema fields, {} rules, {} fills)",
            source.name,
            kind,
            source.target_table,
            source.schema.len(),
            source.rules.len(),
            source.imputations.len()
        );
    }
    Ok(())
}
