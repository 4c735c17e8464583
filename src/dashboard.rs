use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::fetch::{Acquirer, Origin, Source};
use crate::resolve::{resolve, KpiRecord};

/// What one refresh shows.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub records: Vec<KpiRecord>,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub source: String,
    pub refreshed_at: DateTime<Utc>,
}

/// Acquire the sheet and resolve it against the acquirer's schema.
pub async fn refresh(acquirer: &Acquirer, source: &Source) -> Snapshot {
    let acquired = acquirer.acquire(source).await;
    let records = resolve(&acquired.table, acquirer.schema());
    info!(
        source = %source,
        origin = ?acquired.origin,
        kpis = records.len(),
        "dashboard refreshed"
    );
    Snapshot {
        records,
        origin: acquired.origin,
        notice: acquired.notice,
        source: source.to_string(),
        refreshed_at: Utc::now(),
    }
}
