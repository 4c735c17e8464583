use anyhow::Result;
use kpiboard::{config::Settings, dashboard, fetch::Acquirer};
use std::{env, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) settings: env, then positional args ─────────────────────
    let settings = Settings::from_env()?.apply_args(env::args().skip(1));
    let schema = Arc::new(settings.load_schema()?);
    let source = settings.source()?;
    info!(
        source = %source,
        kpis = ?schema.canonical_names(),
        cache_ttl = ?settings.cache_ttl,
        "configured"
    );

    // ─── 3) one refresh ─────────────────────────────────────────────
    let acquirer = Acquirer::new(schema, settings.cache_ttl, settings.fetch_timeout)?;
    let snapshot = dashboard::refresh(&acquirer, &source).await;
    if let Some(notice) = &snapshot.notice {
        warn!("{}", notice);
    }

    // ─── 4) emit ────────────────────────────────────────────────────
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
