use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Cursor;
use tracing::debug;

use crate::resolve::{Cell, RawTable};

/// Parse CSV bytes. The first record with any non-blank cell is the header
/// row; later all-blank records are dropped. Record lengths may vary.
pub fn parse_csv(data: &[u8], source: &str) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // hand-edited sheets are often ragged
        .trim(csv::Trim::All)
        .from_reader(Cursor::new(data));

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("CSV parse error in {} at record {}", source, idx))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        match headers {
            None => {
                headers = Some(
                    record
                        .iter()
                        .map(|s| s.trim_start_matches('\u{feff}').to_string())
                        .collect(),
                )
            }
            Some(_) => rows.push(record.iter().map(Cell::from).collect()),
        }
    }

    let headers = headers.unwrap_or_default();
    debug!(source, columns = headers.len(), rows = rows.len(), "parsed CSV");
    Ok(RawTable::new(headers, rows, source))
}
