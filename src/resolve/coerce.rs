use super::normalize::clean_str;
use super::raw_table::Cell;

const PERCENT_FACTOR: f64 = 100.0;
/// Decimal places kept after scaling, enough to drop binary noise like
/// `0.68 * 100 = 68.00000000000001`.
const SCALE_PRECISION: f64 = 1e10;

/// Numeric value of a cell in percent units, or `None` when the cell is empty
/// or not a number.
///
/// A plain value with `|v| <= threshold` is a fraction and is scaled by 100.
/// Text ending in `%` is already in percent units and is never scaled.
pub fn coerce_cell(cell: &Cell, threshold: Option<f64>) -> Option<f64> {
    let (value, explicit_percent) = match cell {
        Cell::Empty => return None,
        Cell::Number(v) => (*v, false),
        Cell::Text(s) => parse_text(s)?,
    };
    if !value.is_finite() {
        return None;
    }
    if explicit_percent {
        return Some(value);
    }
    Some(scale_fraction(value, threshold))
}

/// `coerce_cell`, with anything unusable read as `0.0`.
pub fn coerce_number(cell: &Cell, threshold: Option<f64>) -> f64 {
    coerce_cell(cell, threshold).unwrap_or(0.0)
}

/// Scaled value, or `value` unchanged when scaling would leave the `f64` range.
pub fn scale_fraction(value: f64, threshold: Option<f64>) -> f64 {
    match threshold {
        Some(t) if value.abs() <= t => {
            let scaled = value * PERCENT_FACTOR;
            if !scaled.is_finite() {
                return value;
            }
            let fine = scaled * SCALE_PRECISION;
            if fine.is_finite() {
                fine.round() / SCALE_PRECISION
            } else {
                scaled
            }
        }
        _ => value,
    }
}

fn parse_text(raw: &str) -> Option<(f64, bool)> {
    let cleaned = clean_str(raw);
    let (body, explicit_percent) = match cleaned.strip_suffix('%') {
        Some(rest) => (rest, true),
        None => (cleaned.as_str(), false),
    };
    let digits: String = body
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<f64>().ok().map(|v| (v, explicit_percent))
}
