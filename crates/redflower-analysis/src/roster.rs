use std::collections::HashMap;
use std::collections::hash_map::Entry;

use redflower_config::{DuplicatePolicy, RosterConfig};
use redflower_core::{EmployeeId, RosterEntry, Table, TableKind, normalize_id};

use crate::error::ProcessingError;

/// Employee id to roster attributes, built once per run.
#[derive(Debug, Clone, Default)]
pub struct RosterLookup {
    entries: HashMap<EmployeeId, RosterEntry>,
    duplicate_ids: Vec<EmployeeId>,
    blank_ids: usize,
}

impl RosterLookup {
    /// Under `LastWins` a repeated employee id replaces the earlier row;
    /// under `Reject` it fails the run. Rows with a blank id are skipped.
    pub fn build(roster: &Table, config: &RosterConfig) -> Result<Self, ProcessingError> {
        roster
            .ensure_rectangular()
            .map_err(|source| ProcessingError::MalformedTable {
                table: TableKind::Roster,
                source,
            })?;

        let id_col = require_column(TableKind::Roster, roster, &config.employee_id)?;
        let org3_col = require_column(TableKind::Roster, roster, &config.org_level3)?;
        let org4_col = require_column(TableKind::Roster, roster, &config.org_level4)?;
        let alias_col = require_column(TableKind::Roster, roster, &config.alias)?;

        let mut lookup = Self::default();
        let mut first_rows = HashMap::<EmployeeId, usize>::new();

        for (row_index, row) in roster.rows.iter().enumerate() {
            let employee_id = normalize_id(&row[id_col]);
            if employee_id.is_empty() {
                lookup.blank_ids += 1;
                continue;
            }

            let entry = RosterEntry {
                employee_id: employee_id.clone(),
                org_level3: row[org3_col].trim().to_owned(),
                org_level4: row[org4_col].trim().to_owned(),
                alias: row[alias_col].trim().to_owned(),
            };

            match lookup.entries.entry(employee_id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(entry);
                    first_rows.insert(employee_id, row_index);
                }
                Entry::Occupied(mut slot) => {
                    if config.duplicate_ids == DuplicatePolicy::Reject {
                        return Err(ProcessingError::DuplicateEmployeeId {
                            first_row: first_rows.get(&employee_id).copied().unwrap_or_default(),
                            duplicate_row: row_index,
                            employee_id,
                        });
                    }
                    slot.insert(entry);
                    if !lookup.duplicate_ids.contains(&employee_id) {
                        lookup.duplicate_ids.push(employee_id);
                    }
                }
            }
        }

        if !lookup.duplicate_ids.is_empty() {
            tracing::warn!(
                duplicates = lookup.duplicate_ids.len(),
                policy = config.duplicate_ids.as_str(),
                "roster repeats employee ids, later rows win"
            );
        }
        if lookup.blank_ids > 0 {
            tracing::warn!(rows = lookup.blank_ids, "roster rows without employee id skipped");
        }

        Ok(lookup)
    }

    pub fn get(&self, employee_id: &str) -> Option<&RosterEntry> {
        self.entries.get(employee_id)
    }

    pub fn contains(&self, employee_id: &str) -> bool {
        self.entries.contains_key(employee_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids that appeared more than once, in first-repeat order.
    pub fn duplicate_ids(&self) -> &[EmployeeId] {
        &self.duplicate_ids
    }

    pub fn blank_id_rows(&self) -> usize {
        self.blank_ids
    }
}

pub(crate) fn require_column(
    kind: TableKind,
    table: &Table,
    label: &str,
) -> Result<usize, ProcessingError> {
    table
        .column_index(label)
        .ok_or_else(|| ProcessingError::MissingColumn {
            table: kind,
            column: label.to_owned(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADERS: [&str; 4] = ["员工系统号", "三级组织", "四级组织", "花名"];

    #[test]
    fn build_indexes_entries_by_trimmed_id() {
        let roster = Table::from_strs(
            &HEADERS,
            &[
                &[" E1 ", "Sales", "SalesA", "Ace"],
                &["E2", "Eng", "EngA", ""],
            ],
        );

        let lookup = RosterLookup::build(&roster, &RosterConfig::default()).expect("build");

        assert_eq!(lookup.len(), 2);
        let entry = lookup.get("E1").expect("E1 present");
        assert_eq!(entry.org_level3, "Sales");
        assert_eq!(entry.alias, "Ace");
        assert!(lookup.duplicate_ids().is_empty());
    }

    #[test]
    fn duplicate_ids_take_the_last_row_by_default() {
        let roster = Table::from_strs(
            &HEADERS,
            &[
                &["E1", "Sales", "SalesA", "Ace"],
                &["E1", "Eng", "EngB", "Byte"],
            ],
        );

        let lookup = RosterLookup::build(&roster, &RosterConfig::default()).expect("build");

        assert_eq!(lookup.len(), 1);
        let entry = lookup.get("E1").expect("E1 present");
        assert_eq!(entry.org_level3, "Eng");
        assert_eq!(entry.org_level4, "EngB");
        assert_eq!(entry.alias, "Byte");
        assert_eq!(lookup.duplicate_ids(), ["E1".to_owned()]);
    }

    #[test]
    fn duplicate_ids_fail_under_reject_policy() {
        let roster = Table::from_strs(
            &HEADERS,
            &[
                &["E1", "Sales", "SalesA", "Ace"],
                &["E2", "Eng", "EngA", ""],
                &["E1", "Eng", "EngB", "Byte"],
            ],
        );
        let config = RosterConfig {
            duplicate_ids: DuplicatePolicy::Reject,
            ..RosterConfig::default()
        };

        let err = RosterLookup::build(&roster, &config).expect_err("expected duplicate error");
        assert_eq!(
            err,
            ProcessingError::DuplicateEmployeeId {
                employee_id: "E1".to_owned(),
                first_row: 0,
                duplicate_row: 2,
            }
        );
    }

    #[test]
    fn blank_ids_are_skipped() {
        let roster = Table::from_strs(
            &HEADERS,
            &[&["  ", "Sales", "SalesA", ""], &["E2", "Eng", "EngA", ""]],
        );

        let lookup = RosterLookup::build(&roster, &RosterConfig::default()).expect("build");

        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.blank_id_rows(), 1);
        assert!(!lookup.contains(""));
    }

    #[test]
    fn ragged_roster_is_a_processing_error() {
        let roster = Table::from_strs(&HEADERS, &[&["E1", "Sales"]]);

        let err = RosterLookup::build(&roster, &RosterConfig::default()).expect_err("ragged");
        assert!(matches!(
            err,
            ProcessingError::MalformedTable {
                table: TableKind::Roster,
                ..
            }
        ));
    }

    #[test]
    fn missing_column_is_reported_when_called_without_validation() {
        let roster = Table::from_strs(&["员工系统号", "三级组织", "四级组织"], &[]);

        let err = RosterLookup::build(&roster, &RosterConfig::default()).expect_err("missing");
        assert_eq!(
            err,
            ProcessingError::MissingColumn {
                table: TableKind::Roster,
                column: "花名".to_owned(),
            }
        );
    }
}
