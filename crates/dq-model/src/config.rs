//! Source configuration models.
//!
//! A pipeline run is driven by a declarative list of sources, each naming
//! where its data comes from, the declared schema, the primary key, the
//! business rules every row must satisfy, and the repair recipe applied
//! after validation. Loaded once and validated up front; immutable for the
//! lifetime of a run.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DqError, Result};
use crate::table::Value;

/// How a source's raw table is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Csv,
    ApiJson,
}

/// Declared column type. Integer and float columns are nullable: a value
/// that fails conversion becomes null rather than raising.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Integer,
    Float,
    Boolean,
    Text,
}

/// One step of the repair recipe, applied in declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImputationRule {
    /// Every null cell in `field` becomes `value`.
    Constant { field: String, value: Value },
    /// For rows where `field` is null, assign the result of `expression`
    /// evaluated against the row's current values.
    Formula { field: String, expression: String },
}

impl ImputationRule {
    pub fn field(&self) -> &str {
        match self {
            ImputationRule::Constant { field, .. } | ImputationRule::Formula { field, .. } => field,
        }
    }
}

fn default_dedup() -> bool {
    true
}

/// Configuration for a single source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Unique key used to refer to this source.
    pub name: String,
    pub kind: SourceKind,
    /// File path for `csv` sources, URL for `api_json` sources.
    pub location: String,
    /// Name of the persistence target replaced wholesale on load.
    pub target_table: String,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub schema: BTreeMap<String, SemanticType>,
    /// Boolean predicates a row must all satisfy to stay in the working set.
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default = "default_dedup")]
    pub dedup: bool,
    #[serde(default)]
    pub imputations: Vec<ImputationRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    /// Path of the SQLite database targets are written to.
    pub database: Option<PathBuf>,
}

/// The whole declarative configuration for a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl PipelineConfig {
    /// Looks up a source by name.
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Structural validation, run once at load time: source names must be
    /// unique and every primary-key field must appear in the schema.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(DqError::Config(format!(
                    "duplicate source name `{}`",
                    source.name
                )));
            }
            for field in &source.primary_key {
                if !source.schema.contains_key(field) {
                    return Err(DqError::Config(format!(
                        "source `{}`: primary key field `{field}` is not in the schema",
                        source.name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[defaults]
database = "pipeline.db"

[[sources]]
name = "lead_api"
kind = "api_json"
location = "https://example.com/api/data"
target_table = "lead_levels"
primary_key = ["id"]
rules = ["zip_code >= 19019", "zip_code <= 19160"]

[sources.schema]
id = "integer"
zip_code = "integer"
num_screen = "integer"
num_bll_5plus = "integer"
perc_5plus = "float"
data_redacted = "boolean"

[[sources.imputations]]
kind = "constant"
field = "num_bll_5plus"
value = 2

[[sources.imputations]]
kind = "formula"
field = "perc_5plus"
expression = "num_bll_5plus / num_screen * 100"
"#;

    #[test]
    fn sample_config_parses_and_validates() {
        let config: PipelineConfig = toml::from_str(SAMPLE).expect("parse config");
        config.validate().expect("validate config");

        let source = config.source("lead_api").expect("source present");
        assert_eq!(source.kind, SourceKind::ApiJson);
        assert_eq!(source.schema.get("id"), Some(&SemanticType::Integer));
        assert_eq!(source.rules.len(), 2);
        assert!(source.dedup, "dedup defaults on");
        match &source.imputations[0] {
            ImputationRule::Constant { field, value } => {
                assert_eq!(field, "num_bll_5plus");
                assert_eq!(value, &Value::Int(2));
            }
            other => panic!("expected constant fill, got {other:?}"),
        }
        assert!(config.source("nope").is_none());
    }

    #[test]
    fn primary_key_outside_schema_is_rejected() {
        let raw = r#"
[[sources]]
name = "tax_csv"
kind = "csv"
location = "balances.csv"
target_table = "tax_levels"
primary_key = ["objectid"]

[sources.schema]
zip_code = "integer"
"#;
        let config: PipelineConfig = toml::from_str(raw).expect("parse config");
        let err = config.validate().expect_err("pk not in schema");
        assert!(matches!(err, DqError::Config(_)), "got {err:?}");
    }

    #[test]
    fn duplicate_source_names_are_rejected() {
        let raw = r#"
[[sources]]
name = "a"
kind = "csv"
location = "a.csv"
target_table = "a"

[[sources]]
name = "a"
kind = "csv"
location = "b.csv"
target_table = "b"
"#;
        let config: PipelineConfig = toml::from_str(raw).expect("parse config");
        assert!(config.validate().is_err());
    }
}
