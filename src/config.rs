use anyhow::{Context, Result};
use std::{env, time::Duration};

use crate::fetch::Source;
use crate::schema::KpiSchema;

pub const DEFAULT_SOURCE: &str = "kpi.xlsx";
pub const DEFAULT_SCHEMA: &str = "plan_vs_actual";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Runtime settings for one dashboard process.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Workbook path or URL (`KPI_SOURCE`).
    pub source: String,
    /// Preset name or schema file path (`KPI_SCHEMA`).
    pub schema: String,
    /// `KPI_CACHE_TTL_SECS`
    pub cache_ttl: Duration,
    /// `KPI_FETCH_TIMEOUT_SECS`
    pub fetch_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            schema: DEFAULT_SCHEMA.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut s = Settings::default();
        if let Some(v) = lookup("KPI_SOURCE").filter(|v| !v.trim().is_empty()) {
            s.source = v;
        }
        if let Some(v) = lookup("KPI_SCHEMA").filter(|v| !v.trim().is_empty()) {
            s.schema = v;
        }
        if let Some(v) = lookup("KPI_CACHE_TTL_SECS") {
            s.cache_ttl = parse_secs("KPI_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("KPI_FETCH_TIMEOUT_SECS") {
            s.fetch_timeout = parse_secs("KPI_FETCH_TIMEOUT_SECS", &v)?;
        }
        Ok(s)
    }

    /// Positional CLI arguments: `[SOURCE] [SCHEMA]`.
    pub fn apply_args<I: IntoIterator<Item = String>>(mut self, args: I) -> Self {
        let mut args = args.into_iter();
        if let Some(source) = args.next() {
            self.source = source;
        }
        if let Some(schema) = args.next() {
            self.schema = schema;
        }
        self
    }

    pub fn source(&self) -> Result<Source> {
        Source::parse(&self.source)
    }

    pub fn load_schema(&self) -> Result<KpiSchema> {
        KpiSchema::from_preset_or_path(&self.schema)
    }
}

fn parse_secs(key: &str, v: &str) -> Result<Duration> {
    let secs: u64 = v
        .trim()
        .parse()
        .with_context(|| format!("{} must be a whole number of seconds, got {:?}", key, v))?;
    Ok(Duration::from_secs(secs))
}
