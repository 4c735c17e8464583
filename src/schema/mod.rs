// src/schema/mod.rs
use anyhow::{bail, Context, Result};
use std::{collections::HashSet, fs, path::Path};
use tracing::{debug, info};

use crate::resolve::normalize_header;

/// Largest accepted `percent_threshold`; anything bigger would rescale
/// values that are already percentages.
pub const MAX_PERCENT_THRESHOLD: f64 = 100.0;

pub mod presets;
pub mod types;

pub use types::{DemoValues, Field, FieldPositions, FieldSynonyms, KpiSchema, KpiSlot};

impl KpiSchema {
    /// Parse a schema from YAML (or JSON, which YAML accepts) and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let schema: KpiSchema =
            serde_yaml::from_str(text).context("parsing KPI schema document")?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load and validate a schema file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading KPI schema {}", path.display()))?;
        let schema = Self::from_yaml_str(&text)
            .with_context(|| format!("loading KPI schema {}", path.display()))?;
        info!(path = %path.display(), kpis = schema.kpis.len(), "loaded KPI schema");
        Ok(schema)
    }

    /// A preset name, or else a path to a YAML/JSON schema file.
    pub fn from_preset_or_path(name_or_path: &str) -> Result<Self> {
        if let Some(schema) = Self::preset(name_or_path) {
            debug!(preset = name_or_path, "using built-in KPI schema");
            return Ok(schema);
        }
        Self::from_path(name_or_path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.kpis.is_empty() {
            bail!("KPI schema lists no KPIs");
        }
        let mut seen = HashSet::new();
        for (idx, slot) in self.kpis.iter().enumerate() {
            let key = normalize_header(&slot.name);
            if key.is_empty() {
                bail!("KPI at index {} has a blank name", idx);
            }
            if !seen.insert(key) {
                bail!("KPI `{}` is listed more than once", slot.name);
            }
        }
        if let Some(t) = self.percent_threshold {
            if !t.is_finite() || !(0.0..=MAX_PERCENT_THRESHOLD).contains(&t) {
                bail!(
                    "percent_threshold must be between 0 and {}, got {}",
                    MAX_PERCENT_THRESHOLD,
                    t
                );
            }
        }
        Ok(())
    }

    pub fn canonical_names(&self) -> Vec<&str> {
        self.kpis.iter().map(|k| k.name.as_str()).collect()
    }
}
