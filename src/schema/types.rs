// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// The semantic columns the resolver looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Actual,
    Target,
    Variance,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Actual, Field::Target, Field::Variance];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Name => "name",
            Field::Actual => "actual",
            Field::Target => "target",
            Field::Variance => "variance",
        };
        f.write_str(s)
    }
}

/// Accepted header spellings per field, in priority order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct FieldSynonyms {
    #[serde(default = "default_name_synonyms")]
    pub name: Vec<String>,
    #[serde(default = "default_actual_synonyms")]
    pub actual: Vec<String>,
    #[serde(default = "default_target_synonyms")]
    pub target: Vec<String>,
    #[serde(default = "default_variance_synonyms")]
    pub variance: Vec<String>,
}

impl FieldSynonyms {
    pub fn for_field(&self, field: Field) -> &[String] {
        match field {
            Field::Name => &self.name,
            Field::Actual => &self.actual,
            Field::Target => &self.target,
            Field::Variance => &self.variance,
        }
    }
}

impl Default for FieldSynonyms {
    fn default() -> Self {
        Self {
            name: default_name_synonyms(),
            actual: default_actual_synonyms(),
            target: default_target_synonyms(),
            variance: default_variance_synonyms(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_name_synonyms() -> Vec<String> {
    strings(&["kpi", "kpi name", "metric", "name", "indicator", "measure"])
}

fn default_actual_synonyms() -> Vec<String> {
    strings(&["actual", "actual %", "value", "current", "achieved", "result"])
}

fn default_target_synonyms() -> Vec<String> {
    strings(&["target", "target %", "goal", "plan", "budget", "expected"])
}

fn default_variance_synonyms() -> Vec<String> {
    strings(&["variance", "var", "diff", "difference", "delta", "gap"])
}

/// Column index to use when no header matches a field.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct FieldPositions {
    #[serde(default = "default_name_position")]
    pub name: Option<usize>,
    #[serde(default = "default_actual_position")]
    pub actual: Option<usize>,
    #[serde(default)]
    pub target: Option<usize>,
    #[serde(default)]
    pub variance: Option<usize>,
}

impl FieldPositions {
    pub fn for_field(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => self.name,
            Field::Actual => self.actual,
            Field::Target => self.target,
            Field::Variance => self.variance,
        }
    }
}

impl Default for FieldPositions {
    fn default() -> Self {
        Self {
            name: default_name_position(),
            actual: default_actual_position(),
            target: None,
            variance: None,
        }
    }
}

fn default_name_position() -> Option<usize> {
    Some(0)
}

fn default_actual_position() -> Option<usize> {
    Some(1)
}

/// Numbers shown when the real workbook cannot be loaded.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Default)]
pub struct DemoValues {
    pub actual: f64,
    pub target: f64,
}

/// One dashboard slot.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct KpiSlot {
    pub name: String,
    /// Extra row labels accepted for this KPI.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub demo: Option<DemoValues>,
}

impl KpiSlot {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            demo: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = strings(aliases);
        self
    }

    pub fn with_demo(mut self, actual: f64, target: f64) -> Self {
        self.demo = Some(DemoValues { actual, target });
        self
    }

    /// The canonical name followed by its aliases.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Canonical KPI list plus the header-matching and numeric rules.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct KpiSchema {
    pub kpis: Vec<KpiSlot>,
    #[serde(default)]
    pub synonyms: FieldSynonyms,
    #[serde(default)]
    pub positions: FieldPositions,
    /// Values with `|v| <= percent_threshold` are fractions and get scaled
    /// by 100. `None` turns scaling off.
    #[serde(default = "default_percent_threshold")]
    pub percent_threshold: Option<f64>,
}

pub fn default_percent_threshold() -> Option<f64> {
    Some(1.0)
}
