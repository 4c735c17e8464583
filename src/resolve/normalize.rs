use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s_]+").expect("separator regex should compile"));

/// Comparison key for a header or row label: lowercased, trimmed, with all
/// whitespace and underscores removed. `"Actual_ Pct "` → `"actualpct"`.
pub fn normalize_header(text: &str) -> String {
    SEPARATORS
        .replace_all(text.trim(), "")
        .to_lowercase()
}

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}
