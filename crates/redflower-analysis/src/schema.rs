use redflower_config::{EventColumns, RosterConfig};
use redflower_core::{Table, TableKind};

use crate::error::SchemaError;

/// Checks both input tables against the required-column contract. Only
/// headers are inspected; an empty result means enrichment may proceed.
pub fn validate(
    events: &Table,
    roster: &Table,
    event_columns: &EventColumns,
    roster_columns: &RosterConfig,
) -> Vec<SchemaError> {
    [
        missing_columns(TableKind::Events, events, &event_columns.required()),
        missing_columns(TableKind::Roster, roster, &roster_columns.required()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

fn missing_columns(kind: TableKind, table: &Table, required: &[&str]) -> Option<SchemaError> {
    let missing = required
        .iter()
        .filter(|label| !table.has_column(label))
        .map(|label| (*label).to_owned())
        .collect::<Vec<_>>();

    (!missing.is_empty()).then_some(SchemaError {
        table: kind,
        missing,
    })
}
