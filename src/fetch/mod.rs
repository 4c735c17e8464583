// src/fetch/mod.rs
use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::{fmt, path::PathBuf, sync::Arc, time::Duration};
use tokio::fs;
use tracing::{info, warn};
use url::Url;

use crate::load::{demo_table, parse_table, SheetFormat};
use crate::resolve::RawTable;
use crate::schema::KpiSchema;

pub mod cache;

pub use cache::FetchCache;

/// Where the workbook lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(Url),
}

impl Source {
    /// `http://` and `https://` strings are URLs, anything else a local path.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = Url::parse(s).with_context(|| format!("parsing source URL {}", s))?;
            Ok(Source::Url(url))
        } else {
            Ok(Source::Path(PathBuf::from(s)))
        }
    }

    /// Name used for format detection: the last path segment.
    fn file_name(&self) -> String {
        match self {
            Source::Path(p) => p
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Source::Url(u) => u
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => write!(f, "{}", u),
        }
    }
}

/// GET `url` and return the body; non-2xx statuses are errors.
pub async fn fetch_bytes(client: &Client, url: &Url) -> Result<Vec<u8>> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()?;
    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    Ok(bytes.to_vec())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Live,
    Cached,
    Demo,
}

/// Rows handed to the resolver, plus how they were obtained.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub table: RawTable,
    pub origin: Origin,
    /// Non-blocking message for the user when demo data is shown.
    pub notice: Option<String>,
}

/// Loads the workbook for a refresh, falling back to demo rows on failure.
pub struct Acquirer {
    client: Client,
    cache: FetchCache,
    schema: Arc<KpiSchema>,
}

impl Acquirer {
    pub fn new(schema: Arc<KpiSchema>, cache_ttl: Duration, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(client, schema, cache_ttl))
    }

    pub fn with_client(client: Client, schema: Arc<KpiSchema>, cache_ttl: Duration) -> Self {
        Self {
            client,
            cache: FetchCache::new(cache_ttl),
            schema,
        }
    }

    pub fn schema(&self) -> &KpiSchema {
        &self.schema
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Read and parse `source`. Never fails: any error is logged and turned
    /// into the schema's demo table with a notice.
    #[tracing::instrument(level = "info", skip(self, source), fields(source = %source))]
    pub async fn acquire(&self, source: &Source) -> Acquired {
        match self.try_acquire(source).await {
            Ok((table, origin)) => {
                info!(rows = table.rows.len(), ?origin, "acquired sheet");
                Acquired {
                    table,
                    origin,
                    notice: None,
                }
            }
            Err(e) => {
                warn!("could not load {}: {:#}; showing demo data", source, e);
                Acquired {
                    table: demo_table(&self.schema),
                    origin: Origin::Demo,
                    notice: Some(format!(
                        "Could not load data from {} ({}). Showing demo numbers.",
                        source, e
                    )),
                }
            }
        }
    }

    async fn try_acquire(&self, source: &Source) -> Result<(RawTable, Origin)> {
        let mut fresh_url: Option<&str> = None;
        let (bytes, origin) = match source {
            Source::Path(p) => {
                let data = fs::read(p)
                    .await
                    .with_context(|| format!("reading {}", p.display()))?;
                (data, Origin::Live)
            }
            Source::Url(u) => {
                let key = u.as_str();
                match self.cache.get(key) {
                    Some(hit) => (hit.to_vec(), Origin::Cached),
                    None => {
                        let data = fetch_bytes(&self.client, u).await?;
                        fresh_url = Some(key);
                        (data, Origin::Live)
                    }
                }
            }
        };
        let name = source.file_name();
        let format = SheetFormat::detect(&name, &bytes);
        let label = source.to_string();
        // only bytes that parse are worth keeping
        let to_cache = fresh_url.map(|_| bytes.clone());
        let table = tokio::task::spawn_blocking(move || parse_table(bytes, format, &label))
            .await
            .context("sheet parser task panicked")??;
        if let (Some(key), Some(data)) = (fresh_url, to_cache) {
            self.cache.insert(key, data);
        }
        Ok((table, origin))
    }
}
