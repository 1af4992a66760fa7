// tests/run_sources.rs
mod common;

use std::sync::Arc;

use agenda_watch::{run_sources, Outcome, SourceRegistry, Stage};
use common::*;

fn registry() -> (SourceRegistry, Arc<FixedDiscovery>, Arc<FixedDiscovery>) {
    let broken = Arc::new(FixedDiscovery::failing("meetings page returned 503"));
    let lakeside = Arc::new(FixedDiscovery::found(
        Some("https://lakeside.example/agenda-0502.pdf"),
        "2024-05-02",
    ));
    let reg = SourceRegistry::new(vec![
        source("Riverton", broken.clone()),
        source("Lakeside", lakeside.clone()),
    ])
    .unwrap();
    (reg, broken, lakeside)
}

#[tokio::test]
async fn failing_source_does_not_stop_the_next_one() {
    let h = Harness::new();
    let (reg, _, _) = registry();

    let reports = run_sources(&h.pipeline(false), &reg, None).await;

    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].source, "Riverton");
    assert!(matches!(
        reports[0].outcome,
        Outcome::Failed { stage: Stage::Discover, .. }
    ));
    assert_eq!(reports[1].source, "Lakeside");
    assert!(matches!(reports[1].outcome, Outcome::Completed(_)));
    assert_eq!(h.notifier.count(), 1);
}

#[tokio::test]
async fn filter_runs_only_the_named_source() {
    let h = Harness::new();
    let (reg, broken, lakeside) = registry();

    let reports = run_sources(&h.pipeline(false), &reg, Some("Lakeside")).await;

    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].source, "Lakeside");
    assert_eq!(calls(&broken.calls), 0);
    assert_eq!(calls(&lakeside.calls), 1);
}

#[tokio::test]
async fn unknown_filter_runs_nothing() {
    let h = Harness::new();
    let (reg, broken, lakeside) = registry();

    let reports = run_sources(&h.pipeline(false), &reg, Some("Atlantis")).await;

    assert!(reports.is_empty());
    assert_eq!(calls(&broken.calls) + calls(&lakeside.calls), 0);
}
