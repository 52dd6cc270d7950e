use crate::core::reducer::error_digest;
use crate::core::{LoadSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Errors listed individually before the rest are summarized as a count.
pub const ERROR_DIGEST_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub summary: LoadSummary,
    pub error_digest: Vec<String>,
}

pub struct ImportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ImportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<ImportOutcome> {
        tracing::info!("🚀 Starting attendance import");
        self.monitor.log_stats("Start");

        let extracted = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} rows against a roster of {} employees",
            extracted.rows.len(),
            extracted.roster.len()
        );
        self.monitor.log_stats("Extract");

        let result = self.pipeline.transform(extracted).await?;
        let digest = error_digest(&result, ERROR_DIGEST_LIMIT);
        if result.is_clean() {
            tracing::info!("✅ Processed {} attendance records", result.valid_count());
        } else {
            tracing::warn!(
                "⚠️ Found {} validation errors ({} valid records)",
                result.error_count(),
                result.valid_count()
            );
            for line in &digest {
                tracing::warn!("  {}", line);
            }
        }
        self.monitor.log_stats("Transform");

        let summary = self.pipeline.load(result).await?;
        tracing::info!("📁 Import bundle saved to: {}", summary.bundle_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(ImportOutcome {
            summary,
            error_digest: digest,
        })
    }
}
