use crate::core::grid::WorkbookGrid;
use crate::domain::model::FetchReport;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// The two phases of a run plus the final save.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Queries every endpoint and stores the raw responses.
    async fn extract(&self) -> Result<FetchReport>;
    /// Lays every stored response out into staged sheet grids.
    async fn transform(&self) -> Result<WorkbookGrid>;
    /// Applies the staged grids to the workbook and saves it once.
    async fn load(&self, grid: WorkbookGrid) -> Result<String>;
}
