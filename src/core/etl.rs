use crate::domain::model::FetchReport;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives a [`Pipeline`] through its phases.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Fetches every endpoint. Fails when at least one endpoint failed, after
    /// all of them were attempted.
    pub async fn fetch(&self) -> Result<usize> {
        tracing::info!("📡 Fetching responses...");
        let report: FetchReport = self.pipeline.extract().await?;
        tracing::info!(
            "Fetched {} of {} responses",
            report.succeeded(),
            report.outcomes.len()
        );
        self.monitor.log_stats("fetch");
        report.into_result()
    }

    /// Transcribes the stored responses and saves the workbook once.
    pub async fn transcribe(&self) -> Result<String> {
        tracing::info!("📝 Transcribing responses...");
        let grid = self.pipeline.transform().await?;
        tracing::info!(
            "Staged {} cells across {} sheets",
            grid.cell_count(),
            grid.sheet_names().count()
        );
        self.monitor.log_stats("transcribe");

        tracing::info!("💾 Saving workbook...");
        let output_path = self.pipeline.load(grid).await?;
        self.monitor.log_stats("save");
        Ok(output_path)
    }

    /// Fetch followed by transcription. Nothing is transcribed when a fetch
    /// failed, so the workbook never mixes fresh and stale responses.
    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting catalog run");
        let fetched = self.fetch().await?;
        tracing::info!("All {} responses fetched", fetched);

        let output_path = self.transcribe().await?;
        self.monitor.log_final_stats();
        Ok(output_path)
    }
}
