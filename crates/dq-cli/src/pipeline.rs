//! Pipeline orchestration.
//!
//! Sources are processed one after another, each start to finish:
//! read → schema validation → rule filtering → cleaning → load. A failing
//! source is reported and skipped; the rest of the run continues.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;

use dq_clean::clean;
use dq_expr::Expr;
use dq_ingest::Reader;
use dq_load::Loader;
use dq_model::{DqError, ImputationRule, PipelineConfig, Result, SourceConfig};
use dq_validate::{validate_rules, validate_schema};

use crate::types::{RunReport, SourceOutcome};

/// Loads and fully validates a configuration file. Rules and formulas are
/// compiled here too, so a typo fails the run before anything is fetched.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let raw = std::fs::read_to_string(path)?;
    let config: PipelineConfig =
        toml::from_str(&raw).map_err(|error| DqError::Config(error.to_string()))?;
    config.validate()?;
    check_expressions(&config)?;
    Ok(config)
}

fn check_expressions(config: &PipelineConfig) -> Result<()> {
    for source in &config.sources {
        for rule in &source.rules {
            Expr::parse(rule).map_err(|error| {
                DqError::Config(format!("source `{}`: rule `{rule}`: {error}", source.name))
            })?;
        }
        for imputation in &source.imputations {
            if let ImputationRule::Formula { expression, .. } = imputation {
                Expr::parse(expression).map_err(|error| {
                    DqError::Config(format!(
                        "source `{}`: formula `{expression}`: {error}",
                        source.name
                    ))
                })?;
            }
        }
    }
    Ok(())
}

/// Runs every configured source against `loader`. One source's failure
/// never stops the others.
pub fn run_pipeline(config: &PipelineConfig, loader: &mut dyn Loader) -> RunReport {
    let started_at = Utc::now();
    let start = Instant::now();
    let reader = Reader::new(config);

    let mut sources = Vec::with_capacity(config.sources.len());
    for source in &config.sources {
        let outcome = match process_source(&reader, source, loader) {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(source = %source.name, %error, "source failed");
                SourceOutcome::failed(&source.name, &source.target_table, error.to_string())
            }
        };
        sources.push(outcome);
    }

    RunReport {
        started_at,
        duration: start.elapsed(),
        sources,
    }
}

fn process_source(
    reader: &Reader<'_>,
    source: &SourceConfig,
    loader: &mut dyn Loader,
) -> Result<SourceOutcome> {
    let span = tracing::info_span!("source", source = %source.name);
    let _guard = span.enter();

    let raw = reader.read_source(source)?;
    tracing::info!(rows = raw.len(), "fetched");

    let schema_partition = validate_schema(raw, &source.schema, &source.primary_key)?;
    let schema_rejected = schema_partition.rejected.len();

    let rule_partition = validate_rules(schema_partition.valid, &source.rules)?;
    let rule_rejected = rule_partition.rejected.len();

    let mut table = rule_partition.valid;
    clean(&mut table, source.dedup, &source.imputations)?;

    loader.load(&table, &source.target_table)?;
    tracing::info!(
        loaded = table.len(),
        schema_rejected,
        rule_rejected,
        target = %source.target_table,
        "source complete"
    );

    Ok(SourceOutcome {
        name: source.name.clone(),
        target_table: source.target_table.clone(),
        loaded: table.len(),
        schema_rejected,
        rule_rejected,
        error: None,
    })
}
