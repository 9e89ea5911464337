use redflower_config::ConfigError;
use redflower_core::{TableError, TableKind};
use thiserror::Error;

/// Required columns absent from one input table, in contract order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{table} table is missing columns: {}", .missing.join(", "))]
pub struct SchemaError {
    pub table: TableKind,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessingError {
    #[error("{table} table is malformed: {source}")]
    MalformedTable {
        table: TableKind,
        #[source]
        source: TableError,
    },
    #[error("{table} table has no column '{column}'")]
    MissingColumn { table: TableKind, column: String },
    #[error("events column '{column}' collides with a derived enrichment column")]
    ColumnConflict { column: String },
    #[error(
        "roster lists employee id '{employee_id}' more than once (data rows {first_row} and {duplicate_row})"
    )]
    DuplicateEmployeeId {
        employee_id: String,
        first_row: usize,
        duplicate_row: usize,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("schema validation failed: {}", format_schema_errors(.0))]
    Schema(Vec<SchemaError>),
    #[error("processing failed: {0}")]
    Processing(#[from] ProcessingError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl PipelineError {
    pub fn schema_errors(&self) -> Option<&[SchemaError]> {
        match self {
            Self::Schema(errors) => Some(errors),
            _ => None,
        }
    }
}

fn format_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
