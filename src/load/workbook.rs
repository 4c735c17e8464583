use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::debug;

use crate::resolve::{Cell, RawTable};

fn to_cell(d: &Data) -> Cell {
    match d {
        Data::Float(v) => Cell::Number(*v),
        Data::Int(v) => Cell::Number(*v as f64),
        Data::String(s) => Cell::from(s.as_str()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => Cell::Text(dt.to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::from(s.as_str()),
        _ => Cell::Empty,
    }
}

fn header_text(d: &Data) -> String {
    match to_cell(d) {
        Cell::Empty => String::new(),
        Cell::Number(v) => v.to_string(),
        Cell::Text(s) => s,
    }
}

/// Parse the first worksheet of an XLSX/XLS/ODS workbook. The first row with
/// a non-empty cell is the header row.
pub fn parse_xlsx(data: Vec<u8>, source: &str) -> Result<RawTable> {
    let mut wb = open_workbook_auto_from_rs(Cursor::new(data))
        .with_context(|| format!("opening workbook {}", source))?;
    let range = wb
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("workbook {} has no worksheets", source))?
        .with_context(|| format!("reading first worksheet of {}", source))?;

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for row in range.rows() {
        let cells: Vec<Cell> = row.iter().map(to_cell).collect();
        if cells.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        match headers {
            None => headers = Some(row.iter().map(header_text).collect()),
            Some(_) => rows.push(cells),
        }
    }

    let headers = headers.unwrap_or_default();
    debug!(source, columns = headers.len(), rows = rows.len(), "parsed workbook");
    Ok(RawTable::new(headers, rows, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_cells_map_to_cells() {
        assert_eq!(to_cell(&Data::Float(0.68)), Cell::Number(0.68));
        assert_eq!(to_cell(&Data::Int(72)), Cell::Number(72.0));
        assert_eq!(to_cell(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(to_cell(&Data::String(" EFFICIENCY ".into())), Cell::Text("EFFICIENCY".into()));
        assert_eq!(to_cell(&Data::Empty), Cell::Empty);
        assert_eq!(header_text(&Data::Int(2024)), "2024");
    }

    #[test]
    fn reads_first_sheet_with_header_row() -> Result<()> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        // leading blank row, then header, then data
        sheet.write_string(1, 0, "KPI")?;
        sheet.write_string(1, 1, "Actual")?;
        sheet.write_string(1, 2, "Target")?;
        sheet.write_string(2, 0, "Efficiency")?;
        sheet.write_number(2, 1, 0.68)?;
        sheet.write_number(2, 2, 80.0)?;
        sheet.write_string(3, 0, "Lost Time")?;
        sheet.write_string(3, 1, "n/a")?;
        let bytes = book.save_to_buffer()?;

        let t = parse_xlsx(bytes, "kpi.xlsx")?;
        assert_eq!(t.headers, vec!["KPI", "Actual", "Target"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][1], Cell::Number(0.68));
        assert_eq!(t.rows[0][2], Cell::Number(80.0));
        assert_eq!(t.rows[1][1], Cell::Text("n/a".into()));
        Ok(())
    }

    #[test]
    fn date_cells_become_text() -> Result<()> {
        let mut book = rust_xlsxwriter::Workbook::new();
        let sheet = book.add_worksheet();
        let date_fmt = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_string(0, 0, "Week")?;
        sheet.write_string(0, 1, "Actual")?;
        sheet.write_datetime_with_format(
            1,
            0,
            &rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 1, 31)?,
            &date_fmt,
        )?;
        sheet.write_number(1, 1, 70.0)?;
        let bytes = book.save_to_buffer()?;

        let t = parse_xlsx(bytes, "dated.xlsx")?;
        assert_eq!(t.rows.len(), 1);
        match &t.rows[0][0] {
            Cell::Text(s) => assert!(!s.is_empty()),
            other => panic!("date cell read as {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(parse_xlsx(b"PK\x03\x04not really a zip".to_vec(), "bad.xlsx").is_err());
    }
}
