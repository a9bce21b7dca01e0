use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// A row type of a report table.
///
/// `COLUMNS` must list the serialized fields in declaration order. It is
/// written as the header row, so that an empty report still carries one.
pub trait ReportRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Write `rows` as CSV with a header row, returning the number of data rows.
pub fn write_rows<T: ReportRow, W: Write>(writer: W, rows: &[T]) -> Result<usize> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(rows.len())
}

/// Write `rows` to the CSV file at `path`, replacing any previous content.
pub fn write_csv<T: ReportRow>(path: &Path, rows: &[T]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {:?}", path))?;
    write_rows(file, rows).with_context(|| format!("Failed to write report file {:?}", path))
}
