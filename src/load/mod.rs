// src/load/mod.rs
use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::resolve::{Cell, RawTable};
use crate::schema::KpiSchema;

pub mod delimited;
pub mod workbook;

pub use delimited::parse_csv;
pub use workbook::parse_xlsx;

pub const DEMO_SOURCE: &str = "demo";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    /// From the file extension when it is a known one, else from the bytes.
    pub fn detect(name: &str, data: &[u8]) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") | Some("txt") | Some("tsv") => SheetFormat::Csv,
            Some("xlsx") | Some("xlsm") | Some("xls") | Some("xlsb") | Some("ods") => {
                SheetFormat::Xlsx
            }
            _ if data.starts_with(b"PK\x03\x04") || data.starts_with(b"\xD0\xCF\x11\xE0") => {
                SheetFormat::Xlsx
            }
            _ => SheetFormat::Csv,
        }
    }
}

/// Parse `data` as the given format.
pub fn parse_table(data: Vec<u8>, format: SheetFormat, source: &str) -> Result<RawTable> {
    debug!(source, ?format, bytes = data.len(), "parsing sheet");
    match format {
        SheetFormat::Csv => parse_csv(&data, source),
        SheetFormat::Xlsx => parse_xlsx(data, source),
    }
}

/// A complete sheet for `schema`, one row per KPI with its demo numbers (or
/// zeros). Values carry a `%` so they are never rescaled.
pub fn demo_table(schema: &KpiSchema) -> RawTable {
    let headers = vec!["KPI".to_string(), "Actual".to_string(), "Target".to_string()];
    let rows = schema
        .kpis
        .iter()
        .map(|slot| {
            let demo = slot.demo.unwrap_or_default();
            vec![
                Cell::Text(slot.name.clone()),
                Cell::Text(format!("{}%", demo.actual)),
                Cell::Text(format!("{}%", demo.target)),
            ]
        })
        .collect();
    RawTable::new(headers, rows, DEMO_SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{resolve, KpiRecord};
    use crate::schema::KpiSlot;

    #[test]
    fn detect_by_extension_then_magic() {
        assert_eq!(SheetFormat::detect("a.CSV", b"PK\x03\x04"), SheetFormat::Csv);
        assert_eq!(SheetFormat::detect("kpi.xlsx", b""), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::detect("export?id=3", b"PK\x03\x04..."), SheetFormat::Xlsx);
        assert_eq!(SheetFormat::detect("export", b"KPI,Actual"), SheetFormat::Csv);
    }

    #[test]
    fn parse_table_dispatches_csv() -> Result<()> {
        let t = parse_table(b"KPI,Actual\nEfficiency,70".to_vec(), SheetFormat::Csv, "x")?;
        assert_eq!(t.rows.len(), 1);
        Ok(())
    }

    #[test]
    fn demo_table_resolves_to_demo_numbers() {
        let schema = KpiSchema::plan_vs_actual();
        let out = resolve(&demo_table(&schema), &schema);
        assert_eq!(
            out[0],
            KpiRecord {
                name: "PLAN VS ACTUAL".into(),
                actual: 72.0,
                target: 75.0,
                variance: -3.0,
            }
        );
        assert_eq!(out[2].variance, 2.0);
    }

    #[test]
    fn demo_table_without_demo_values_is_zero() {
        let schema = KpiSchema::with_kpis(vec![KpiSlot::new("OEE").with_demo(0.5, 0.9)]);
        let out = resolve(&demo_table(&schema), &schema);
        // demo numbers are percent units already
        assert_eq!(out[0].actual, 0.5);

        let schema = KpiSchema::with_kpis(vec![KpiSlot::new("SCRAP")]);
        let out = resolve(&demo_table(&schema), &schema);
        assert_eq!(out[0], KpiRecord::zero("SCRAP"));
    }
}
