use serde::{Deserialize, Serialize};

/// One scalar read from a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Text view of the cell, used for matching row labels.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Number(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.trim().to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    /// Column headers as the sheet spells them.
    pub headers: Vec<String>,
    /// Data rows, aligned to `headers` by position. Rows may be ragged.
    pub rows: Vec<Vec<Cell>>,
    /// Where the rows came from (path, URL or "demo"), for logging only.
    pub source: String,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>, source: impl Into<String>) -> Self {
        Self {
            headers,
            rows,
            source: source.into(),
        }
    }

    /// Cell at (`row`, `col`), or `Empty` when the row is shorter than the header.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        const EMPTY: &Cell = &Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(EMPTY)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
