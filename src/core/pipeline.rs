use crate::adapters::storage::LocalStorage;
use crate::adapters::workbook;
use crate::config::toml_config::CatalogConfig;
use crate::core::fetcher::Fetcher;
use crate::core::grid::WorkbookGrid;
use crate::core::transcriber::Transcriber;
use crate::domain::model::{EndpointConfig, FetchReport, ResponseDescriptor};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use std::path::PathBuf;

/// Fetch, transcription and workbook save for the catalog responses.
pub struct CatalogPipeline<S: Storage> {
    fetcher: Fetcher<S>,
    transcriber: Transcriber<S>,
    endpoints: Vec<EndpointConfig>,
    responses: Vec<ResponseDescriptor>,
    workbook_path: PathBuf,
}

impl<S: Storage> CatalogPipeline<S> {
    /// `fetch_storage` receives fetched bodies, `transcribe_storage` is where
    /// the transcriber reads them from.
    pub fn new(fetch_storage: S, transcribe_storage: S, config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_storage, config.timeout(), config.api_key())?,
            transcriber: Transcriber::new(transcribe_storage),
            endpoints: config.endpoints(),
            responses: config.responses(),
            workbook_path: config.workbook_path(),
        })
    }
}

impl CatalogPipeline<LocalStorage> {
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        Self::new(
            LocalStorage::new(config.output_dir()),
            LocalStorage::new(config.input_dir()),
            config,
        )
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for CatalogPipeline<S> {
    async fn extract(&self) -> Result<FetchReport> {
        Ok(self.fetcher.fetch_all(&self.endpoints).await)
    }

    async fn transform(&self) -> Result<WorkbookGrid> {
        self.transcriber.transcribe_all(&self.responses).await
    }

    async fn load(&self, grid: WorkbookGrid) -> Result<String> {
        let written = workbook::commit(&self.workbook_path, &grid)?;
        tracing::debug!("Wrote {} cells to {}", written, self.workbook_path.display());
        Ok(self.workbook_path.display().to_string())
    }
}
