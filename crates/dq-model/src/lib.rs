pub mod config;
pub mod error;
pub mod table;

pub use config::{
    Defaults, ImputationRule, PipelineConfig, SemanticType, SourceConfig, SourceKind,
};
pub use error::{DqError, Result};
pub use table::{Partition, Row, Table, Value, format_numeric};
