use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type EmployeeId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Events,
    Roster,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Events => "events",
            Self::Roster => "roster",
        }
    }
}

impl std::fmt::Display for TableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// A rectangular, already-parsed table. Every cell is text; the host decides
/// how spreadsheet or CSV values are rendered into it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_owned()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| (*cell).to_owned()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first header equal to `label`, ignoring surrounding whitespace.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        let wanted = label.trim();
        self.headers
            .iter()
            .position(|header| header.trim() == wanted)
    }

    pub fn has_column(&self, label: &str) -> bool {
        self.column_index(label).is_some()
    }

    pub fn ensure_rectangular(&self) -> Result<(), TableError> {
        let expected = self.headers.len();
        match self
            .rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            Some((row, cells)) => Err(TableError::RaggedRow {
                row,
                expected,
                found: cells.len(),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub employee_id: EmployeeId,
    pub org_level3: String,
    pub org_level4: String,
    pub alias: String,
}

/// One recognition event that survived the roster join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedEvent {
    pub recipient_id: EmployeeId,
    pub sender_id: EmployeeId,
    pub recipient_name: String,
    pub recipient_org3: String,
    pub recipient_org4: String,
    pub recipient_alias: String,
    pub sender_org3: String,
    pub sender_org4: String,
    /// Cells of the originating event row, in input column order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub recipient_id: EmployeeId,
    pub recipient_name: String,
    pub recipient_alias: String,
    pub recipient_org3: String,
    pub recipient_org4: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeRow {
    pub count: u32,
    pub count_label: String,
    pub roster_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgSummaryRow {
    pub org3: String,
    pub total: u32,
}

pub fn normalize_id(raw: &str) -> EmployeeId {
    raw.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_ignores_surrounding_whitespace() {
        let table = Table::from_strs(&[" 收花人系统号", "送花人系统号 "], &[]);

        assert_eq!(table.column_index("收花人系统号"), Some(0));
        assert_eq!(table.column_index(" 送花人系统号"), Some(1));
        assert!(!table.has_column("收花人姓名"));
    }

    #[test]
    fn ensure_rectangular_reports_first_ragged_row() {
        let table = Table::from_strs(&["a", "b"], &[&["1", "2"], &["3"], &["4", "5", "6"]]);

        let err = table.ensure_rectangular().expect_err("expected ragged row");
        assert_eq!(
            err,
            TableError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn empty_table_is_rectangular() {
        let table = Table::from_strs(&["a"], &[]);
        assert!(table.is_empty());
        assert!(table.ensure_rectangular().is_ok());
    }

    #[test]
    fn table_kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&TableKind::Roster).expect("serialize kind");
        assert_eq!(json, "\"roster\"");
        assert_eq!(TableKind::Events.to_string(), "events");
    }

    #[test]
    fn enriched_event_omits_empty_source_when_serialized() {
        let event = EnrichedEvent {
            recipient_id: "E1".to_owned(),
            sender_id: "E2".to_owned(),
            recipient_name: "Alice".to_owned(),
            recipient_org3: "Sales".to_owned(),
            recipient_org4: "SalesA".to_owned(),
            recipient_alias: "Ace".to_owned(),
            sender_org3: String::new(),
            sender_org4: String::new(),
            source: Vec::new(),
        };

        let json = serde_json::to_string(&event).expect("serialize event");
        assert!(!json.contains("source"));
    }

    #[test]
    fn normalize_id_trims_whitespace() {
        assert_eq!(normalize_id("  E1 \t"), "E1");
    }
}
