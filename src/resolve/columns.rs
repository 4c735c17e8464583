use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

use super::normalize::normalize_header;
use crate::schema::{Field, KpiSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Substring,
    Positional,
}

/// A header picked for some field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMatch {
    pub index: usize,
    pub header: String,
    pub kind: MatchKind,
}

impl ColumnMatch {
    fn new(headers: &[String], index: usize, kind: MatchKind) -> Self {
        Self {
            index,
            header: headers[index].clone(),
            kind,
        }
    }
}

/// Find the header for one field.
///
/// Exact matches win, in candidate priority order. Otherwise the first header
/// (in sheet order) containing any candidate is taken. `None` means the caller
/// should try a positional fallback or treat the field as missing.
pub fn find_column(headers: &[String], candidates: &[String]) -> Option<ColumnMatch> {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let keys = candidate_keys(candidates);
    let free = vec![true; headers.len()];

    if let Some(idx) = exact_match(&normalized, &keys, &free) {
        return Some(ColumnMatch::new(headers, idx, MatchKind::Exact));
    }
    substring_match(&normalized, &keys, &free)
        .map(|(idx, _)| ColumnMatch::new(headers, idx, MatchKind::Substring))
}

fn candidate_keys(candidates: &[String]) -> Vec<String> {
    candidates
        .iter()
        .map(|c| normalize_header(c))
        .filter(|k| !k.is_empty())
        .collect()
}

fn exact_match(normalized: &[String], keys: &[String], free: &[bool]) -> Option<usize> {
    keys.iter().find_map(|key| {
        normalized
            .iter()
            .enumerate()
            .find(|(i, h)| free[*i] && *h == key)
            .map(|(i, _)| i)
    })
}

/// First free header containing a candidate, with the length of the longest
/// candidate it contains.
fn substring_match(normalized: &[String], keys: &[String], free: &[bool]) -> Option<(usize, usize)> {
    normalized.iter().enumerate().find_map(|(i, h)| {
        if !free[i] || h.is_empty() {
            return None;
        }
        keys.iter()
            .filter(|k| h.contains(k.as_str()))
            .map(|k| k.len())
            .max()
            .map(|len| (i, len))
    })
}

/// Where each semantic field lives in a given header row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnLayout {
    pub name: Option<ColumnMatch>,
    pub actual: Option<ColumnMatch>,
    pub target: Option<ColumnMatch>,
    pub variance: Option<ColumnMatch>,
}

impl ColumnLayout {
    pub fn get(&self, field: Field) -> Option<&ColumnMatch> {
        match field {
            Field::Name => self.name.as_ref(),
            Field::Actual => self.actual.as_ref(),
            Field::Target => self.target.as_ref(),
            Field::Variance => self.variance.as_ref(),
        }
    }

    fn set(&mut self, field: Field, m: ColumnMatch) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Actual => &mut self.actual,
            Field::Target => &mut self.target,
            Field::Variance => &mut self.variance,
        };
        *slot = Some(m);
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        self.get(field).map(|m| m.index)
    }

    /// Assign headers to all four fields at once, each header to at most one
    /// field: exact matches first, then substring matches (longest candidate
    /// wins a contested header), then configured positions.
    pub fn detect(headers: &[String], schema: &KpiSchema) -> Self {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let keys: HashMap<Field, Vec<String>> = Field::ALL
            .iter()
            .map(|&f| (f, candidate_keys(schema.synonyms.for_field(f))))
            .collect();
        let mut free = vec![true; headers.len()];
        let mut layout = ColumnLayout::default();

        // 1) exact
        for field in Field::ALL {
            if let Some(idx) = exact_match(&normalized, &keys[&field], &free) {
                free[idx] = false;
                layout.set(field, ColumnMatch::new(headers, idx, MatchKind::Exact));
            }
        }

        // 2) substring, longest candidate first
        loop {
            // ties: earlier header, then earlier field
            let best = Field::ALL
                .iter()
                .enumerate()
                .filter(|(_, f)| layout.get(**f).is_none())
                .filter_map(|(pos, &f)| {
                    substring_match(&normalized, &keys[&f], &free)
                        .map(|(idx, len)| (pos, f, idx, len))
                })
                .max_by(|a, b| a.3.cmp(&b.3).then(b.2.cmp(&a.2)).then(b.0.cmp(&a.0)));
            match best {
                Some((_, field, idx, _)) => {
                    free[idx] = false;
                    layout.set(field, ColumnMatch::new(headers, idx, MatchKind::Substring));
                }
                None => break,
            }
        }

        // 3) positional
        for field in Field::ALL {
            if layout.get(field).is_some() {
                continue;
            }
            if let Some(idx) = schema.positions.for_field(field) {
                if idx < headers.len() && free[idx] {
                    free[idx] = false;
                    layout.set(field, ColumnMatch::new(headers, idx, MatchKind::Positional));
                }
            }
        }

        for field in Field::ALL {
            match layout.get(field) {
                Some(m) => debug!(%field, header = %m.header, kind = ?m.kind, "column matched"),
                None => debug!(%field, "no column for field"),
            }
        }
        layout
    }
}
