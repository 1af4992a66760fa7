// src/ingest/mod.rs
pub mod fetch;
pub mod pipeline;
pub mod providers;
pub mod registry;
pub mod slots;
pub mod types;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

pub use pipeline::{Outcome, Pipeline, Stage};
pub use registry::SourceRegistry;

/// One-time metrics registration (so series show up in the exposition).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "agenda_outcomes_total",
            "Pipeline runs by terminal outcome."
        );
        describe_counter!(
            "agenda_stage_failures_total",
            "Failed pipeline runs by failing stage."
        );
        describe_histogram!("agenda_run_ms", "Per-source pipeline time in milliseconds.");
        describe_gauge!(
            "agenda_last_run_ts",
            "Unix ts when the source loop last finished."
        );
    });
}

#[derive(Debug)]
pub struct SourceReport {
    pub source: String,
    pub outcome: Outcome,
}

/// Run the pipeline for each selected source, strictly one after another.
/// A failing source is reported and the loop moves on.
pub async fn run_sources(
    pipeline: &Pipeline,
    registry: &SourceRegistry,
    filter: Option<&str>,
) -> Vec<SourceReport> {
    ensure_metrics_described();

    let selected = registry.select(filter);
    if selected.is_empty() {
        if let Some(name) = filter {
            tracing::warn!(target: "ingest", source = name, "no configured source with that name");
        }
    }

    let mut reports = Vec::with_capacity(selected.len());
    for source in selected {
        let t0 = std::time::Instant::now();
        let outcome = pipeline.run(source).await;
        let ms = t0.elapsed().as_secs_f64() * 1_000.0;

        histogram!("agenda_run_ms").record(ms);
        counter!("agenda_outcomes_total", "outcome" => outcome.label()).increment(1);
        match &outcome {
            Outcome::Failed { stage, cause } => {
                counter!("agenda_stage_failures_total", "stage" => stage.as_str()).increment(1);
                tracing::warn!(
                    target: "ingest",
                    source = %source.name,
                    stage = %stage,
                    error = ?cause,
                    "source failed"
                );
            }
            other => {
                tracing::info!(target: "ingest", source = %source.name, outcome = other.label(), "finished");
            }
        }

        reports.push(SourceReport {
            source: source.name.clone(),
            outcome,
        });
    }

    gauge!("agenda_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    reports
}
