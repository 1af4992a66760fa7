use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Prometheus recorder for one-shot runs. Instead of serving `/metrics`, the
/// exposition is written to a file at exit for a node_exporter textfile
/// collector to pick up.
pub struct Metrics {
    pub handle: PrometheusHandle,
    textfile: PathBuf,
}

impl Metrics {
    /// Install the global recorder. Call at most once per process.
    pub fn init(textfile: impl Into<PathBuf>) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self {
            handle,
            textfile: textfile.into(),
        })
    }

    pub fn textfile(&self) -> &Path {
        &self.textfile
    }

    /// Render and write the exposition, via a temp file so the collector never
    /// reads a half-written file.
    pub fn flush(&self) -> Result<()> {
        let tmp = self.textfile.with_extension("prom.tmp");
        std::fs::write(&tmp, self.handle.render())
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.textfile)
            .with_context(|| format!("renaming into {}", self.textfile.display()))?;
        Ok(())
    }
}
