// src/resolve/mod.rs
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::schema::{Field, KpiSchema, KpiSlot};

pub mod coerce;
pub mod columns;
pub mod normalize;
pub mod raw_table;

pub use coerce::{coerce_cell, coerce_number};
pub use columns::{find_column, ColumnLayout, ColumnMatch, MatchKind};
pub use normalize::{clean_str, normalize_header};
pub use raw_table::{Cell, RawTable};

/// One dashboard card's numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub name: String,
    pub actual: f64,
    pub target: f64,
    /// `actual - target` unless the sheet supplies it.
    pub variance: f64,
}

impl KpiRecord {
    pub fn zero(name: &str) -> Self {
        Self {
            name: name.to_string(),
            actual: 0.0,
            target: 0.0,
            variance: 0.0,
        }
    }
}

/// Map `table` onto the schema's KPI list.
///
/// Always returns one record per KPI, in schema order. Missing columns,
/// missing rows and unparseable cells all read as zero; this never fails.
pub fn resolve(table: &RawTable, schema: &KpiSchema) -> Vec<KpiRecord> {
    let layout = ColumnLayout::detect(&table.headers, schema);
    let threshold = schema.percent_threshold;

    let Some(name_col) = layout.index(Field::Name) else {
        warn!(source = %table.source, "no KPI name column; every KPI is zero");
        return schema.kpis.iter().map(|k| KpiRecord::zero(&k.name)).collect();
    };

    let row_keys: Vec<String> = (0..table.rows.len())
        .map(|r| {
            table
                .cell(r, name_col)
                .as_text()
                .map(|s| normalize_header(&s))
                .unwrap_or_default()
        })
        .collect();

    schema
        .kpis
        .iter()
        .map(|slot| match find_row(&row_keys, slot) {
            Some(r) => {
                let read = |field: Field| {
                    layout
                        .index(field)
                        .and_then(|c| coerce_cell(table.cell(r, c), threshold))
                };
                let actual = read(Field::Actual).unwrap_or(0.0);
                let target = read(Field::Target).unwrap_or(0.0);
                let variance =
                    read(Field::Variance).unwrap_or_else(|| derive_variance(actual, target));
                debug!(kpi = %slot.name, row = r, actual, target, variance, "resolved KPI");
                KpiRecord {
                    name: slot.name.clone(),
                    actual,
                    target,
                    variance,
                }
            }
            None => {
                warn!(kpi = %slot.name, source = %table.source, "KPI row not found; using zeros");
                KpiRecord::zero(&slot.name)
            }
        })
        .collect()
}

/// `actual - target`, or `0.0` when the difference overflows.
fn derive_variance(actual: f64, target: f64) -> f64 {
    let v = actual - target;
    if v.is_finite() {
        v
    } else {
        warn!(actual, target, "variance overflows; using zero");
        0.0
    }
}

/// `resolve` with the default matching rules and an ad-hoc KPI list.
pub fn resolve_names(table: &RawTable, names: &[&str]) -> Vec<KpiRecord> {
    let schema = KpiSchema::with_kpis(names.iter().map(|n| KpiSlot::new(n)).collect());
    resolve(table, &schema)
}

/// First row whose label equals one of the slot's labels, else the first row
/// whose label contains one.
fn find_row(row_keys: &[String], slot: &KpiSlot) -> Option<usize> {
    let labels: Vec<String> = slot
        .labels()
        .map(normalize_header)
        .filter(|l| !l.is_empty())
        .collect();

    row_keys
        .iter()
        .position(|k| !k.is_empty() && labels.iter().any(|l| l == k))
        .or_else(|| {
            row_keys
                .iter()
                .position(|k| !k.is_empty() && labels.iter().any(|l| k.contains(l.as_str())))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,kpiboard::resolve=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| Cell::from(*c)).collect())
                .collect(),
            "test",
        )
    }

    fn names(records: &[KpiRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn resolves_full_sheet_in_schema_order() {
        init_test_logging();
        let t = table(
            &["KPI", "Actual", "Target"],
            &[
                &["Lost Time", "12", "10"],
                &["Efficiency", "0.68", "0.8"],
                &["Plan vs Actual", "72", "75"],
            ],
        );
        let out = resolve(&t, &KpiSchema::plan_vs_actual());
        assert_eq!(names(&out), vec!["PLAN VS ACTUAL", "EFFICIENCY", "LOST TIME"]);
        assert_eq!(
            out[0],
            KpiRecord {
                name: "PLAN VS ACTUAL".into(),
                actual: 72.0,
                target: 75.0,
                variance: -3.0,
            }
        );
        assert_eq!(out[1].actual, 68.0);
        assert_eq!(out[1].target, 80.0);
        assert_eq!(out[1].variance, -12.0);
        assert_eq!(out[2].variance, 2.0);
    }

    #[test]
    fn always_n_records_even_when_empty() {
        init_test_logging();
        let schema = KpiSchema::productivity();
        for t in [
            RawTable::default(),
            table(&["KPI", "Actual"], &[]),
            table(&[], &[&["x", "1"]]),
            table(&["only"], &[&["PRODUCTIVITY"]]),
        ] {
            let out = resolve(&t, &schema);
            assert_eq!(
                names(&out),
                vec!["PRODUCTIVITY", "EFFICIENCY", "VARIANCE FROM TARGET"]
            );
        }
    }

    #[test]
    fn missing_row_is_zero_filled() {
        let t = table(
            &["Metric", "Actual", "Target"],
            &[&["PLAN VS ACTUAL", "72", "75"], &["EFFICIENCY", "68", "80"]],
        );
        let out = resolve(&t, &KpiSchema::plan_vs_actual());
        assert_eq!(out.len(), 3);
        assert_eq!(out[2], KpiRecord::zero("LOST TIME"));
    }

    #[test]
    fn first_duplicate_wins() {
        let t = table(
            &["KPI", "Actual", "Target"],
            &[&["Efficiency", "60", "80"], &["EFFICIENCY", "99", "80"]],
        );
        let out = resolve_names(&t, &["EFFICIENCY"]);
        assert_eq!(out[0].actual, 60.0);
    }

    #[test]
    fn exact_label_beats_earlier_containing_label() {
        let t = table(
            &["KPI", "Actual"],
            &[&["Line 2 Efficiency", "50"], &["Efficiency", "70"]],
        );
        assert_eq!(resolve_names(&t, &["EFFICIENCY"])[0].actual, 70.0);

        let t = table(&["KPI", "Actual"], &[&["Line 2 Efficiency", "50"]]);
        assert_eq!(resolve_names(&t, &["EFFICIENCY"])[0].actual, 50.0);
    }

    #[test]
    fn aliases_match_rows() {
        let t = table(&["KPI", "Actual", "Target"], &[&["Downtime", "14", "10"]]);
        let out = resolve(&t, &KpiSchema::plan_vs_actual());
        assert_eq!(out[2].actual, 14.0);
        assert_eq!(out[2].variance, 4.0);
    }

    #[test]
    fn explicit_variance_column_is_used() {
        let t = table(
            &["KPI", "Actual", "Target", "Variance"],
            &[&["EFFICIENCY", "68", "80", "-0.1"], &["LOST TIME", "12", "10", ""]],
        );
        let out = resolve(&t, &KpiSchema::plan_vs_actual());
        // supplied as a fraction, scaled like the other columns
        assert_eq!(out[1].variance, -10.0);
        // blank variance cell falls back to derivation
        assert_eq!(out[2].variance, 2.0);
    }

    #[test]
    fn synonym_and_substring_headers() {
        for actual_header in ["ACTUAL", "actual_%", "Achieved", "ACTUAL_PCT_2024"] {
            let t = table(
                &["kpi_name", actual_header, "Goal"],
                &[&["Efficiency", "68", "80"]],
            );
            let out = resolve_names(&t, &["EFFICIENCY"]);
            assert_eq!(out[0].actual, 68.0, "header {:?}", actual_header);
            assert_eq!(out[0].target, 80.0);
        }
    }

    #[test]
    fn unlabelled_sheet_uses_positions() {
        let t = table(&["", ""], &[&["Efficiency", "0.7"]]);
        let out = resolve_names(&t, &["EFFICIENCY"]);
        assert_eq!(out[0].actual, 70.0);
        assert_eq!(out[0].target, 0.0);
        assert_eq!(out[0].variance, 70.0);
    }

    #[test]
    fn malformed_cells_read_as_zero() {
        let t = RawTable::new(
            vec!["KPI".into(), "Actual".into(), "Target".into()],
            vec![
                vec![Cell::from("EFFICIENCY"), Cell::from("oops"), Cell::Number(75.0)],
                // ragged row
                vec![Cell::from("LOST TIME")],
            ],
            "test",
        );
        let out = resolve(&t, &KpiSchema::plan_vs_actual());
        assert_eq!(out[1].actual, 0.0);
        assert_eq!(out[1].variance, -75.0);
        assert_eq!(out[2], KpiRecord::zero("LOST TIME"));
    }

    #[test]
    fn overflowing_variance_reads_as_zero() -> anyhow::Result<()> {
        let t = table(&["KPI", "Actual", "Target"], &[&["Efficiency", "1e308", "-1e308"]]);
        let out = resolve_names(&t, &["EFFICIENCY"]);
        assert_eq!(out[0].actual, 1e308);
        assert_eq!(out[0].target, -1e308);
        assert_eq!(out[0].variance, 0.0);

        let json = serde_json::to_value(&out[0])?;
        assert!(json["variance"].is_number());
        Ok(())
    }

    #[test]
    fn resolve_is_idempotent() {
        let t = table(&["KPI", "Actual", "Target"], &[&["Efficiency", "0.68", "n/a"]]);
        let schema = KpiSchema::plan_vs_actual();
        assert_eq!(resolve(&t, &schema), resolve(&t, &schema));
    }
}
