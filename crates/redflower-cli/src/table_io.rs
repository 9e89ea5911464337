use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use redflower_core::Table;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

const UTF8_BOM: &str = "\u{feff}";

/// Reads a CSV file with a header row. Rows of unequal width are kept as-is
/// so the analysis reports them as malformed input.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .iter()
        .enumerate()
        .map(|(index, header)| {
            if index == 0 {
                header.trim_start_matches(UTF8_BOM).to_owned()
            } else {
                header.to_owned()
            }
        })
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("failed to read data row {index} of {}", path.display()))?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Writes a UTF-8 CSV with a leading byte-order mark, which spreadsheet
/// applications need to detect the encoding of non-ASCII headers.
pub fn write_csv_table(path: &Path, table: &Table) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(UTF8_BOM.as_bytes())
        .with_context(|| format!("failed to write {}", path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(&table.headers)
        .with_context(|| format!("failed to write header row of {}", path.display()))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .with_context(|| format!("failed to write row of {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(&mut file, value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    writeln!(&mut file).context("failed to write trailing newline")?;
    Ok(())
}

/// Writes a table as a JSON array of objects keyed by header, keys in header
/// order.
pub fn write_json_table(path: &Path, table: &Table) -> Result<()> {
    write_json(path, &TableRecords(table))
}

struct TableRecords<'a>(&'a Table);

impl Serialize for TableRecords<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.rows.len()))?;
        for row in &self.0.rows {
            seq.serialize_element(&Record {
                headers: &self.0.headers,
                row,
            })?;
        }
        seq.end()
    }
}

struct Record<'a> {
    headers: &'a [String],
    row: &'a [String],
}

impl Serialize for Record<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, value) in self.headers.iter().zip(self.row) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}
