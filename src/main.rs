//! agenda-watch — binary entrypoint.
//! Checks each configured council for a newly posted agenda, emails a summary
//! of anything new, and records it so it is never processed twice.
//!
//! Meant to be run from cron; every run is a single pass over the catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use agenda_watch::config::{self, Settings};
use agenda_watch::ingest::slots::Slots;
use agenda_watch::metrics::Metrics;
use agenda_watch::notify::{EmailNotifier, LogNotifier, Notifier};
use agenda_watch::{run_sources, Outcome, Pipeline, SqliteStore};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    Smtp,
    Log,
}

#[derive(Debug, Parser)]
#[command(name = "agenda-watch", version, about)]
struct Cli {
    /// Only check this source (exact catalog name).
    #[arg(long)]
    source: Option<String>,

    /// Source catalog path (overrides SOURCES_CONFIG_PATH).
    #[arg(long, value_name = "PATH")]
    sources: Option<PathBuf>,

    /// How notifications are delivered.
    #[arg(long, value_enum, default_value_t = Transport::Smtp)]
    notify: Transport,

    /// Print the configured sources and exit.
    #[arg(long)]
    list: bool,
}

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("agenda_watch=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .ok()
        .is_some_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env when present; real environment variables win.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    let catalog = match cli.sources.as_deref() {
        Some(p) => config::load_sources_from(p)?,
        None => config::load_sources_default()?,
    };
    let registry = config::build_registry(catalog)?;

    if cli.list {
        for s in registry.iter() {
            let fields: Vec<_> = s.rules.names().collect();
            println!("{}\t[{}]", s.name, fields.join(", "));
        }
        return Ok(());
    }

    let settings = Settings::from_env()?;
    let metrics = settings
        .metrics_textfile
        .as_ref()
        .map(|p| Metrics::init(p.clone()))
        .transpose()?;

    // The only fatal failure: no store, no run.
    let store = SqliteStore::open(&settings.db_path)
        .with_context(|| format!("opening agenda store {}", settings.db_path.display()))?;

    let notifier: Arc<dyn Notifier> = match cli.notify {
        Transport::Smtp => Arc::new(EmailNotifier::from_env()?),
        Transport::Log => Arc::new(LogNotifier),
    };

    let pipeline = Pipeline::new(
        Arc::new(store),
        notifier,
        settings.recipient.clone(),
        Slots::new(&settings.files_dir),
    )
    .keep_files(settings.keep_files);

    let reports = run_sources(&pipeline, &registry, cli.source.as_deref()).await;

    for r in &reports {
        println!("{}: {}", r.source, r.outcome);
    }
    let failed = reports.iter().filter(|r| r.outcome.is_failed()).count();
    let done = reports
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Completed(_)))
        .count();
    tracing::info!(
        sources = reports.len(),
        completed = done,
        failed,
        "run finished"
    );

    if let Some(m) = &metrics {
        if let Err(e) = m.flush() {
            tracing::warn!(error = ?e, path = %m.textfile().display(), "metrics textfile not written");
        }
    }

    Ok(())
}
